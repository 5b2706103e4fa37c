//! Page title to physical path lookup.
//!
//! Rendered pages embed their canonical wiki title in a MediaWiki config
//! script (`"wgPageName"`). [`LinkMap::build`] recovers that marker from
//! every HTML file under an output tree and records where the page actually
//! lives, so later stages can turn logical links into file paths. The map
//! round-trips through a small XML file between pipeline stages.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use sxd_document::parser;

use crate::xml::xml_escape;

/// The `mw.config.set({... "wgPageName": ...})` script block.
static RE_CONFIG_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<script>[^<]*mw\.config\.set([^<]*wgPageName[^<]*)</script>").unwrap()
});
static RE_PAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""wgPageName":"([^"]*)""#).unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s").unwrap());

/// Title → path-relative-to-root mapping over a rendered HTML tree.
#[derive(Debug, Default)]
pub struct LinkMap {
    mapping: BTreeMap<String, String>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans all HTML files under `root` and extracts each page's embedded
    /// title marker. Files without a recognizable marker are skipped; the
    /// tree contains index and template pages that never carry one.
    pub fn build(root: &Path) -> Result<LinkMap> {
        let pattern = root.join("**/*.html");
        let pattern = pattern.to_str().context("root path is not valid UTF-8")?;

        let mut map = LinkMap::new();
        for entry in glob::glob(pattern).context("invalid HTML glob pattern")? {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    log::warn!("skipping unreadable path: {e}");
                    continue;
                }
            };
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;

            let Some(title) = extract_page_title(&text) else {
                continue;
            };

            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .to_string();
            map.add(title, rel);
        }
        Ok(map)
    }

    /// Reads a persisted map written by [`LinkMap::write`].
    pub fn read(path: &Path) -> Result<LinkMap> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read link map: {}", path.display()))?;
        let package = parser::parse(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse link map {}: {e:?}", path.display()))?;
        let document = package.as_document();

        let mut map = LinkMap::new();
        let Some(root) = document
            .root()
            .children()
            .into_iter()
            .find_map(|c| c.element())
        else {
            return Ok(map);
        };
        for child in root.children() {
            let Some(el) = child.element() else { continue };
            match (el.attribute_value("from"), el.attribute_value("to")) {
                (Some(from), Some(to)) => map.add(from.to_string(), to.to_string()),
                _ => log::warn!("link map entry without from/to attributes, skipping"),
            }
        }
        Ok(map)
    }

    /// Serializes the map as `<files><file from=".." to=".."/></files>`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<files>\n");
        for (from, to) in &self.mapping {
            out.push_str(&format!(
                "  <file from=\"{}\" to=\"{}\"/>\n",
                xml_escape(from),
                xml_escape(to)
            ));
        }
        out.push_str("</files>\n");
        fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn add(&mut self, title: String, target: String) {
        self.mapping.insert(title, target);
    }

    /// Physical path for a logical title. A miss is reported, not raised;
    /// callers substitute a placeholder and keep going.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.mapping.get(title).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }
}

/// Pulls the canonical page title out of a rendered page's config script.
fn extract_page_title(html: &str) -> Option<String> {
    let script = RE_CONFIG_SCRIPT.captures(html)?;
    // The config object may be pretty-printed; normalize before matching.
    let packed = RE_WHITESPACE.replace_all(&script[1], "");
    let title = RE_PAGE_NAME.captures(&packed)?;
    Some(title[1].to_string())
}
