//! Declaration and description extraction from a rendered reference page.
//!
//! Pages carry their declarations in the first `table.t-dcl-begin`; the
//! prose that follows it is either a single paragraph or a run of
//! `div.t-li1` list items, one per numbered declaration version.

use std::sync::LazyLock;

use regex::Regex;
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

use super::desc::{trim_description, DescOptions};
use super::DdgError;

static SEL_DCL_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.t-dcl-begin").unwrap());
static SEL_DCL_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr.t-dcl").unwrap());
static SEL_GESHI: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.mw-geshi").unwrap());
static SEL_MARK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.t-mark").unwrap());
static SEL_LI_INDEX: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.t-li").unwrap());

static RE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static RE_DELETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=\s*delete\s*;").unwrap());
static RE_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d+)\)").unwrap());
static RE_LI_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)\)\s*$").unwrap());
static RE_LI_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)-(\d+)\)\s*$").unwrap());
static RE_LI_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+),(\d+)\)\s*$").unwrap());

/// One declaration snippet: code plus the version marker of its row, if any.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub code: String,
    pub version: Option<u32>,
}

/// Extracts the declarations naming `name` from the page's declaration
/// table. Rows without code, rows for other identifiers, deleted functions
/// and declarations superseded in later standards (`until` markers) are
/// ignored.
pub fn declarations(doc: &Html, name: &str) -> Result<Vec<Declaration>, DdgError> {
    let table = doc
        .select(&SEL_DCL_TABLE)
        .next()
        .ok_or(DdgError::DclTableNotFound)?;

    let mut dcls = Vec::new();
    let mut ignored = false;

    for row in table.select(&SEL_DCL_ROW) {
        let cells: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect();

        let code_el = cells.first().and_then(|td| td.select(&SEL_GESHI).next());
        let Some(code_el) = code_el else {
            ignored = true;
            continue;
        };
        let code: String = code_el.text().collect();
        let code = RE_NEWLINES.replace_all(&code, "\n").to_string();

        if !contains_identifier(&code, name) {
            ignored = true;
            continue;
        }
        if RE_DELETED.is_match(&code) {
            ignored = true;
            continue;
        }

        // declarations marked "until C++NN" have been superseded
        if let Some(mark) = cells.get(2).and_then(|td| td.select(&SEL_MARK).next()) {
            let mark_text: String = mark.text().collect();
            if mark_text.to_lowercase().contains("until") {
                ignored = true;
                continue;
            }
        }

        let version = cells.get(1).and_then(|td| {
            let text: String = td.text().collect();
            RE_VERSION
                .captures(&text)
                .and_then(|c| c[1].parse::<u32>().ok())
        });

        dcls.push(Declaration { code, version });
    }

    if dcls.is_empty() {
        if ignored {
            return Err(DdgError::AllDeclarationsIgnored);
        }
        return Err(DdgError::NoDeclarations);
    }
    Ok(dcls)
}

/// The version number shared by all declarations, or `None` when they
/// disagree or none carries one.
pub fn common_version(decls: &[Declaration]) -> Option<u32> {
    let mut version = None;
    for decl in decls {
        if let Some(v) = decl.version {
            match version {
                None => version = Some(v),
                Some(prev) if prev != v => return None,
                Some(_) => {}
            }
        }
    }
    version
}

/// Extracts and trims the short description that follows the declaration
/// table: either a plain paragraph, or the `div.t-li1` list item whose
/// `N)` / `N-M)` / `N,M)` index matches `version`.
pub fn short_description(
    doc: &Html,
    version: Option<u32>,
    opts: &DescOptions,
) -> Result<String, DdgError> {
    let table = doc
        .select(&SEL_DCL_TABLE)
        .next()
        .ok_or(DdgError::DclTableNotFound)?;

    let first = table
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .ok_or(DdgError::NoElementsAfterTable)?;

    if first.value().name() == "p" {
        return Ok(trim_description(&flatten_markup(first, None), opts));
    }

    if !is_li_item(first) {
        return Err(DdgError::NoDescription);
    }
    let version = version.ok_or(DdgError::VersionedNoVersion)?;

    let mut curr = Some(first);
    while let Some(el) = curr {
        if !is_li_item(el) {
            break;
        }
        if let Some(index_el) = el.select(&SEL_LI_INDEX).next() {
            let index_text: String = index_el.text().collect();
            if index_matches(&index_text, version) {
                return Ok(trim_description(&flatten_markup(el, Some(index_el)), opts));
            }
        }
        curr = el.next_siblings().filter_map(ElementRef::wrap).next();
    }
    Err(DdgError::ListNotNumbered)
}

fn is_li_item(el: ElementRef) -> bool {
    el.value().name() == "div" && el.value().classes().any(|c| c == "t-li1")
}

/// Does the `N)` / `N-M)` / `N,M)` list index select `version`?
fn index_matches(text: &str, version: u32) -> bool {
    if let Some(c) = RE_LI_SINGLE.captures(text) {
        return c[1].parse() == Ok(version);
    }
    if let Some(c) = RE_LI_RANGE.captures(text) {
        let lo: u32 = match c[1].parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        let hi: u32 = match c[2].parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        return lo <= version && version <= hi;
    }
    if let Some(c) = RE_LI_PAIR.captures(text) {
        return c[1].parse() == Ok(version) || c[2].parse() == Ok(version);
    }
    false
}

/// `name` as a standalone identifier: an occurrence delimited by non-word
/// characters on both sides.
fn contains_identifier(code: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(found) = code[from..].find(name) {
        let begin = from + found;
        let end = begin + name.len();
        let before = code[..begin].chars().next_back();
        let after = code[end..].chars().next();
        let delimited = |c: Option<char>| {
            matches!(c, Some(c) if !(c.is_ascii_alphanumeric() || c == '_'))
        };
        if delimited(before) && delimited(after) {
            return true;
        }
        from = end;
    }
    false
}

/// Flattens an element's content to text with only `<code>` and `<i>`
/// markup retained: `span.mw-geshi` becomes `<code>`, `<b>` becomes `<i>`,
/// every other tag is dropped while its text is kept. `skip` drops one
/// subtree (the list-index span) from the output.
fn flatten_markup(el: ElementRef, skip: Option<ElementRef>) -> String {
    let mut out = String::new();
    let skip_id = skip.map(|s| s.id());
    for child in el.children() {
        flatten_node(child, skip_id, &mut out);
    }
    out
}

fn flatten_node(node: NodeRef<'_, Node>, skip: Option<NodeId>, out: &mut String) {
    if Some(node.id()) == skip {
        return;
    }
    match node.value() {
        Node::Text(text) => out.push_str(&escape_text(&text.text)),
        Node::Element(el) => {
            let tag = match el.name() {
                "span" if el.classes().any(|c| c == "mw-geshi") => Some("code"),
                "code" => Some("code"),
                "i" => Some("i"),
                "b" => Some("i"),
                _ => None,
            };
            if let Some(tag) = tag {
                out.push('<');
                out.push_str(tag);
                out.push('>');
            }
            for child in node.children() {
                flatten_node(child, skip, out);
            }
            if let Some(tag) = tag {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
        _ => {}
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    const DCL_TABLE: &str = r#"
        <table class="t-dcl-begin"><tbody>
          <tr class="t-dcl">
            <td><div><span class="mw-geshi">void pop_back();</span></div></td>
            <td>(1)</td>
            <td></td>
          </tr>
          <tr class="t-dcl">
            <td><div><span class="mw-geshi">void pop_back( T x ) = delete;</span></div></td>
            <td>(2)</td>
            <td></td>
          </tr>
          <tr class="t-dcl">
            <td><div><span class="mw-geshi">void other_name();</span></div></td>
            <td>(3)</td>
            <td></td>
          </tr>
        </tbody></table>"#;

    #[test]
    fn extracts_matching_declarations() {
        let doc = page(&format!("{DCL_TABLE}<p>Removes the last element.</p>"));
        let dcls = declarations(&doc, "pop_back").unwrap();
        assert_eq!(dcls.len(), 1);
        assert_eq!(dcls[0].code, "void pop_back();");
        assert_eq!(dcls[0].version, Some(1));
    }

    #[test]
    fn superseded_declarations_are_ignored() {
        let doc = page(
            r#"<table class="t-dcl-begin"><tbody>
                 <tr class="t-dcl">
                   <td><div><span class="mw-geshi">int f();</span></div></td>
                   <td>(1)</td>
                   <td><span class="t-mark">(until C++11)</span></td>
                 </tr>
               </tbody></table>"#,
        );
        assert!(matches!(
            declarations(&doc, "f"),
            Err(DdgError::AllDeclarationsIgnored)
        ));
    }

    #[test]
    fn missing_table_is_an_error() {
        let doc = page("<p>No declarations here.</p>");
        assert!(matches!(
            declarations(&doc, "f"),
            Err(DdgError::DclTableNotFound)
        ));
    }

    #[test]
    fn paragraph_description_is_extracted() {
        let doc = page(&format!(
            "{DCL_TABLE}<p>Removes the <b>last</b> element. More text.</p>"
        ));
        let desc = short_description(&doc, None, &DescOptions::default()).unwrap();
        assert_eq!(desc, "Removes the <i>last</i> element.");
    }

    #[test]
    fn versioned_description_picks_matching_item() {
        let doc = page(&format!(
            r#"{DCL_TABLE}
               <div class="t-li1"><span class="t-li">2)</span> Second version text.</div>
               <div class="t-li1"><span class="t-li">1)</span> First version text.</div>"#
        ));
        let desc = short_description(&doc, Some(1), &DescOptions::default()).unwrap();
        assert_eq!(desc, "First version text.");
    }

    #[test]
    fn versioned_description_supports_ranges() {
        assert!(index_matches("1-3)", 2));
        assert!(!index_matches("1-3)", 4));
        assert!(index_matches("2,4)", 4));
        assert!(!index_matches("2,4)", 3));
        assert!(index_matches(" 5) ", 5));
    }

    #[test]
    fn versioned_description_without_version_is_an_error() {
        let doc = page(&format!(
            r#"{DCL_TABLE}<div class="t-li1"><span class="t-li">1)</span> Text.</div>"#
        ));
        assert!(matches!(
            short_description(&doc, None, &DescOptions::default()),
            Err(DdgError::VersionedNoVersion)
        ));
    }

    #[test]
    fn common_version_agreement() {
        let d = |v| Declaration {
            code: String::new(),
            version: v,
        };
        assert_eq!(common_version(&[d(Some(2)), d(None), d(Some(2))]), Some(2));
        assert_eq!(common_version(&[d(Some(1)), d(Some(2))]), None);
        assert_eq!(common_version(&[d(None)]), None);
    }

    #[test]
    fn identifier_match_requires_word_boundaries() {
        assert!(contains_identifier("void pop_back();", "pop_back"));
        assert!(!contains_identifier("void pop_back_n();", "pop_back"));
        assert!(!contains_identifier("pop_back", "pop_back"));
    }

    #[test]
    fn flatten_keeps_inline_markup_only() {
        let doc = page("<p>Uses <span class=\"mw-geshi\">f(x)</span> and <a href=\"y\">links</a> &amp; <b>bold</b>.</p>");
        let p = doc
            .select(&Selector::parse("p").unwrap())
            .next()
            .unwrap();
        assert_eq!(
            flatten_markup(p, None),
            "Uses <code>f(x)</code> and links &amp; <i>bold</i>."
        );
    }
}
