//! Qualified name and link resolution — pure composition rules.
//!
//! Given a node and the resolved name/link of its parent, these functions
//! compute the node's own fully-qualified name (`::`-joined) and relative
//! link (`/`-joined). The composition rules differ per entity kind;
//! constructors, destructors, specializations and overloads are derived
//! from the parent's identity rather than carrying one of their own.

use crate::model::{EntityId, EntityIndex, EntityKind, StructureError};

/// Fully-qualified name of `id` under `parent_name` (empty at top level).
pub fn full_name(
    index: &EntityIndex,
    id: EntityId,
    parent_name: &str,
) -> Result<String, StructureError> {
    let node = index.node(id);

    if parent_name.is_empty()
        && matches!(
            node.kind,
            EntityKind::Constructor
                | EntityKind::Destructor
                | EntityKind::Overload
                | EntityKind::Specialization
        )
    {
        return Err(StructureError::MissingParent(node.kind));
    }

    match node.kind {
        EntityKind::Constructor => Ok(format!(
            "{parent_name}::{}",
            last_name_component(parent_name)
        )),
        EntityKind::Destructor => Ok(format!(
            "{parent_name}::~{}",
            last_name_component(parent_name)
        )),
        EntityKind::Specialization => Ok(format!("{}<{parent_name}>", index.name(id)?)),
        EntityKind::Overload => Ok(format!("{}({parent_name})", index.name(id)?)),
        _ => {
            let name = index.name(id)?;
            if parent_name.is_empty() {
                Ok(name.to_string())
            } else {
                Ok(format!("{parent_name}::{name}"))
            }
        }
    }
}

/// Full relative link of `id` under `parent_link` (empty at top level).
pub fn full_link(
    index: &EntityIndex,
    id: EntityId,
    parent_link: &str,
) -> Result<String, StructureError> {
    let node = index.node(id);

    match node.kind {
        // Alias typedefs link to wherever the aliased class/enum lives and
        // contribute no segment of their own.
        EntityKind::Typedef => match &node.alias {
            Some(alias) => own_link(index, index.find_alias(alias)?),
            None => Ok(link_append(parent_link, &own_link(index, id)?)),
        },
        EntityKind::Constructor => {
            let base = last_link_segment(parent_link).to_string();
            Ok(link_append(parent_link, &own_link_or(index, id, &base)))
        }
        EntityKind::Destructor => {
            let base = format!("~{}", last_link_segment(parent_link));
            Ok(link_append(parent_link, &own_link_or(index, id, &base)))
        }
        _ => Ok(link_append(parent_link, &own_link(index, id)?)),
    }
}

/// The node's own relative link component: the `link` attribute if present
/// (`.` meaning "no separate page"), else its name.
pub fn own_link(index: &EntityIndex, id: EntityId) -> Result<String, StructureError> {
    match index.node(id).link.as_deref() {
        None => Ok(index.name(id)?.to_string()),
        Some(".") => Ok(String::new()),
        Some(link) => Ok(link.to_string()),
    }
}

/// Like [`own_link`], with an explicit fallback instead of the name.
fn own_link_or(index: &EntityIndex, id: EntityId, default: &str) -> String {
    match index.node(id).link.as_deref() {
        None => default.to_string(),
        Some(".") => String::new(),
        Some(link) => link.to_string(),
    }
}

/// Joins two possibly empty relative links without producing a stray `/`.
pub fn link_append(parent_link: &str, link: &str) -> String {
    if !parent_link.is_empty() && !link.is_empty() {
        format!("{parent_link}/{link}")
    } else {
        format!("{parent_link}{link}")
    }
}

fn last_name_component(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

fn last_link_segment(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}
