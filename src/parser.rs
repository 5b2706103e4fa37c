//! Index document parser — XML text to [`EntityIndex`].

use crate::model::{Entity, EntityId, EntityIndex, EntityKind, StructureError};
use sxd_document::dom::Element;
use sxd_document::parser;

/// Parses an index document from XML text.
///
/// The document root must be `<index>`; its children become the top-level
/// entities. Elements with unrecognized names carry no identifier data and
/// are skipped with a warning.
pub fn parse_index(text: &str) -> Result<EntityIndex, StructureError> {
    let package = parser::parse(text).map_err(|e| StructureError::Parse(format!("{e:?}")))?;
    let document = package.as_document();

    let root = document
        .root()
        .children()
        .into_iter()
        .find_map(|c| c.element())
        .ok_or_else(|| StructureError::Parse("document has no root element".to_string()))?;
    if root.name().local_part() != "index" {
        return Err(StructureError::Parse(format!(
            "expected root element 'index', found '{}'",
            root.name().local_part()
        )));
    }

    let mut index = EntityIndex::new();
    for child in root.children() {
        if let Some(el) = child.element() {
            convert(&mut index, el, None);
        }
    }
    Ok(index)
}

/// Converts one element subtree into arena nodes.
fn convert(index: &mut EntityIndex, el: Element<'_>, parent: Option<EntityId>) {
    let tag = el.name().local_part();
    let Some(kind) = EntityKind::from_tag(tag) else {
        log::warn!("skipping unknown index element '{tag}'");
        return;
    };

    let id = index.push(Entity {
        kind,
        name: el.attribute_value("name").map(str::to_string),
        link: el.attribute_value("link").map(str::to_string),
        alias: el.attribute_value("alias").map(str::to_string),
        parent,
        children: Vec::new(),
    });

    for child in el.children() {
        if let Some(child_el) = child.element() {
            convert(index, child_el, Some(id));
        }
    }
}
