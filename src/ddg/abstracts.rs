//! Abstract assembly — declaration snippets plus a trimmed description,
//! packed into the HTML fragment DuckDuckGo renders as the instant answer.

use super::page::Declaration;

/// Limits and layout for the code part of an abstract.
#[derive(Debug, Clone)]
pub struct AbstractOptions {
    /// Total line budget for declaration code.
    pub max_code_lines: usize,
    /// One `<pre>` block per snippet instead of a single shared block.
    pub split_code_snippets: bool,
}

impl Default for AbstractOptions {
    fn default() -> Self {
        AbstractOptions {
            max_code_lines: 6,
            split_code_snippets: false,
        }
    }
}

/// Builds the abstract fragment.
///
/// The first declaration is always shown regardless of size; later ones are
/// added only while they fit the remaining line budget, keeping one line in
/// reserve for the omission notice whenever something has to be dropped.
pub fn build_abstract(decls: &[Declaration], desc: &str, opts: &AbstractOptions) -> String {
    let mut snippets: Vec<String> = Vec::new();
    let mut budget = opts.max_code_lines as i64;
    let mut limited = false;

    for (i, decl) in decls.iter().enumerate() {
        let code = decl.code.trim().replace('<', "&lt;").replace('>', "&gt;");
        let num_lines = (code.matches('\n').count() + 1) as i64;

        let first = i == 0;
        let last = i == decls.len() - 1;
        if !first {
            let allowed = if last { budget } else { budget - 1 };
            if num_lines > allowed {
                limited = true;
                break;
            }
        }

        snippets.push(code);
        budget -= num_lines;
    }

    let mut code_text = if opts.split_code_snippets {
        snippets
            .iter()
            .map(|s| format!("<pre><code>{s}</code></pre>"))
            .collect::<String>()
    } else {
        format!("<pre><code>{}</code></pre>", snippets.join("\n\n"))
    };
    if limited {
        code_text.push_str("\n<p><em>Additional declarations have been omitted</em></p>");
    }

    format!("<section class=\"prog__container\">\n<p>{desc}</p>\n{code_text}\n</section>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(code: &str) -> Declaration {
        Declaration {
            code: code.to_string(),
            version: None,
        }
    }

    #[test]
    fn single_declaration() {
        let out = build_abstract(
            &[decl("void pop_back();")],
            "Removes the last element.",
            &AbstractOptions::default(),
        );
        assert_eq!(
            out,
            "<section class=\"prog__container\">\n\
             <p>Removes the last element.</p>\n\
             <pre><code>void pop_back();</code></pre>\n\
             </section>"
        );
    }

    #[test]
    fn angle_brackets_are_escaped() {
        let out = build_abstract(
            &[decl("template <class T>\nvoid swap( T& a, T& b );")],
            "Swaps the values.",
            &AbstractOptions::default(),
        );
        assert!(out.contains("template &lt;class T&gt;"));
        assert!(!out.contains("<class T>"));
    }

    #[test]
    fn first_snippet_exceeding_budget_is_kept() {
        let big = decl("a\nb\nc\nd\ne\nf\ng\nh");
        let out = build_abstract(
            &[big],
            "Desc.",
            &AbstractOptions {
                max_code_lines: 2,
                split_code_snippets: false,
            },
        );
        assert!(out.contains("a\nb\nc\nd\ne\nf\ng\nh"));
        assert!(!out.contains("omitted"));
    }

    #[test]
    fn later_snippets_respect_budget() {
        let out = build_abstract(
            &[decl("one();"), decl("two();"), decl("three\nfour\nfive")],
            "Desc.",
            &AbstractOptions {
                max_code_lines: 3,
                split_code_snippets: false,
            },
        );
        assert!(out.contains("one();"));
        assert!(out.contains("two();"));
        assert!(!out.contains("three"));
        assert!(out.contains("<p><em>Additional declarations have been omitted</em></p>"));
    }

    #[test]
    fn split_snippets_get_their_own_blocks() {
        let out = build_abstract(
            &[decl("one();"), decl("two();")],
            "Desc.",
            &AbstractOptions {
                max_code_lines: 6,
                split_code_snippets: true,
            },
        );
        assert!(out.contains(
            "<pre><code>one();</code></pre><pre><code>two();</code></pre>"
        ));
    }
}
