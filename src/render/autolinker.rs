//! AutoLinker definition output — JSON `groups` and `links` arrays consumed
//! by the AutoLinker wiki extension.
//!
//! Two passes over the same tree: the first collects groups (top-level
//! class/enum hierarchies with their member URLs relative to the group's
//! base), the second collects flat links, adding an extra short-name entry
//! for direct members of a group. Typedef expansion is disabled for the
//! groups pass so aliases don't spawn duplicate groups.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{EntityId, EntityIndex, EntityKind, StructureError};
use crate::walk::{ItemSink, WalkOptions, Walker};

#[derive(Debug, Serialize)]
struct Group {
    base_url: String,
    name: String,
    urls: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    on_group: Option<String>,
    string: String,
    target: String,
}

#[derive(Serialize)]
struct Definitions {
    groups: Vec<Group>,
    links: Vec<Link>,
}

pub fn render(index: &EntityIndex) -> Result<String, StructureError> {
    let mut groups = GroupsSink::default();
    let opts = WalkOptions {
        expand_typedefs: false,
        expand_inherits: true,
    };
    Walker::with_options(index, opts).run(&mut groups)?;

    let mut links = LinksSink::default();
    Walker::new(index).run(&mut links)?;

    let mut links = links.links;
    links.sort_by(|a, b| a.target.cmp(&b.target));

    let definitions = Definitions {
        groups: groups.groups.into_values().collect(),
        links,
    };
    // Serialization of these derive structs cannot fail.
    serde_json::to_string_pretty(&definitions)
        .map_err(|e| StructureError::Parse(e.to_string()))
}

/// A group is a class/enum whose ancestors are all classes/enums, i.e. a
/// documented type hierarchy rooted at the top level.
fn is_group(index: &EntityIndex, id: EntityId) -> bool {
    let mut curr = id;
    loop {
        if !matches!(
            index.node(curr).kind,
            EntityKind::Class | EntityKind::Enum
        ) {
            return false;
        }
        match index.node(curr).parent {
            Some(parent) => curr = parent,
            None => return true,
        }
    }
}

fn parent_is_group(index: &EntityIndex, id: EntityId) -> bool {
    match index.node(id).parent {
        Some(parent) => is_group(index, parent),
        None => false,
    }
}

/// Entity kinds that get a short-name link entry within their group.
fn needs_entry_in_group(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::Const
            | EntityKind::Function
            | EntityKind::Class
            | EntityKind::Enum
            | EntityKind::Variable
    )
}

/// Name with all leading qualifiers stripped.
fn rel_name(full_name: &str) -> &str {
    match full_name.rfind("::") {
        Some(pos) => &full_name[pos + 2..],
        None => full_name,
    }
}

#[derive(Default)]
struct GroupsSink {
    groups: BTreeMap<String, Group>,
    curr_group: Option<String>,
}

impl ItemSink for GroupsSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        let index = walker.index();
        if is_group(index, id) {
            self.groups.insert(
                full_name.to_string(),
                Group {
                    base_url: full_link.to_string(),
                    name: full_name.to_string(),
                    urls: vec![String::new()],
                },
            );
            let saved = self.curr_group.replace(full_name.to_string());
            walker.process_children(self, id, full_name, full_link)?;
            self.curr_group = saved;
        } else {
            walker.process_children(self, id, full_name, full_link)?;
        }

        if parent_is_group(index, id) {
            if let Some(group) = self
                .curr_group
                .as_ref()
                .and_then(|name| self.groups.get_mut(name))
            {
                // Members outside the group's base URL indicate a broken
                // document; they are simply not listed.
                if let Some(rel) = full_link.strip_prefix(&group.base_url) {
                    if !group.urls.iter().any(|u| u == rel) {
                        group.urls.push(rel.to_string());
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct LinksSink {
    links: Vec<Link>,
    curr_group: Option<String>,
}

impl ItemSink for LinksSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        let index = walker.index();
        self.links.push(Link {
            on_group: None,
            string: full_name.to_string(),
            target: full_link.to_string(),
        });

        if is_group(index, id) {
            let saved = self.curr_group.replace(full_name.to_string());
            walker.process_children(self, id, full_name, full_link)?;
            self.curr_group = saved;
        } else {
            walker.process_children(self, id, full_name, full_link)?;
        }

        if parent_is_group(index, id)
            && self.curr_group.is_some()
            && needs_entry_in_group(index.node(id).kind)
        {
            self.links.push(Link {
                on_group: self.curr_group.clone(),
                string: rel_name(full_name).to_string(),
                target: full_link.to_string(),
            });
        }
        Ok(())
    }
}
