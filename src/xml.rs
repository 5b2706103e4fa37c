//! Minimal XML escaping for hand-built output fragments.

/// Escapes the five XML special characters. Used for attribute values and
/// element text in the generated DevHelp, Doxygen and link-map XML.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '>' => out.push_str("&gt;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}
