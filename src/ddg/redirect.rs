//! Redirect title generation for the DuckDuckGo feed.
//!
//! Every identifier produces candidate search titles from the suffixes of
//! its `::`-split qualifiers (plain and with underscores replaced by
//! spaces), tagged with a priority equal to the number of qualifiers
//! stripped. Constructors and destructors drop the repeated class-name
//! component and gain `constructor`/`destructor` prefixed and appended
//! variants instead. Duplicate titles are resolved globally: only the
//! lowest-strip-count candidates survive, and a title claimed by more than
//! one distinct target is dropped entirely rather than guessed at.

use std::collections::{BTreeMap, BTreeSet};

use super::ItemType;

#[derive(Debug, Clone)]
pub struct Redirect {
    pub title: String,
    pub target: String,
    /// Number of leading qualifiers stripped; lower wins.
    pub priority: usize,
}

/// Appends the redirect candidates for one identifier. Identifiers with
/// template, parenthesis or operator punctuation get no redirects at all.
pub fn build_redirects(redirects: &mut Vec<Redirect>, ident: &str, item_type: ItemType) {
    if ident.contains(['(', ')', '<', '>']) || ident.contains("operator") {
        return;
    }

    let mut parts: Vec<&str> = ident.split("::").collect();

    match item_type {
        ItemType::Class
        | ItemType::Function
        | ItemType::FunctionInline
        | ItemType::Variable
        | ItemType::VariableInline
        | ItemType::Enum
        | ItemType::EnumConst => {
            suffix_titles(redirects, ident, &parts, "", "");
        }
        ItemType::Constructor | ItemType::ConstructorInline => {
            parts.pop();
            suffix_titles(redirects, ident, &parts, "constructor", "");
            suffix_titles(redirects, ident, &parts, "", "constructor");
        }
        ItemType::Destructor | ItemType::DestructorInline => {
            parts.pop();
            suffix_titles(redirects, ident, &parts, "destructor", "");
            suffix_titles(redirects, ident, &parts, "", "destructor");
        }
    }
}

fn suffix_titles(
    redirects: &mut Vec<Redirect>,
    target: &str,
    parts: &[&str],
    prepend: &str,
    append: &str,
) {
    let prepend = if prepend.is_empty() {
        String::new()
    } else {
        format!("{prepend} ")
    };
    let append = if append.is_empty() {
        String::new()
    } else {
        format!(" {append}")
    };

    for stripped in 0..parts.len() {
        let suffix = &parts[stripped..];
        let plain = collapse_spaces(&format!("{prepend}{}{append}", suffix.join(" ")));
        let spaced = collapse_spaces(&format!(
            "{prepend}{}{append}",
            suffix
                .iter()
                .map(|part| part.replace('_', " "))
                .collect::<Vec<_>>()
                .join(" ")
        ));

        redirects.push(Redirect {
            title: plain.clone(),
            target: target.to_string(),
            priority: stripped,
        });
        if spaced != plain {
            redirects.push(Redirect {
                title: spaced,
                target: target.to_string(),
                priority: stripped,
            });
        }
    }
}

fn collapse_spaces(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains("  ") {
        out = out.replace("  ", " ");
    }
    out
}

/// Resolves duplicates and renders the final `R` lines, sorted by title.
pub fn output_redirects(redirects: &[Redirect]) -> String {
    // title -> priority -> targets
    let mut by_title: BTreeMap<&str, BTreeMap<usize, BTreeSet<&str>>> = BTreeMap::new();
    for r in redirects {
        by_title
            .entry(&r.title)
            .or_default()
            .entry(r.priority)
            .or_default()
            .insert(&r.target);
    }

    let mut out = String::new();
    for (title, priorities) in &by_title {
        let Some((_, targets)) = priorities.iter().next() else {
            continue;
        };
        // several distinct targets at the best priority: ambiguous, drop
        if targets.len() != 1 {
            continue;
        }
        let Some(target) = targets.iter().next() else {
            continue;
        };
        out.push_str(&format!(
            "{title}\tR\t{target}\t\t\t\t\t\t\t\t\t\t\t\n"
        ));
    }
    out
}
