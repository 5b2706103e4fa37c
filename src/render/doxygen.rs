//! Doxygen tag file output.
//!
//! Unlike the flat generators, this one rebuilds a namespace/class tree
//! from the `::`-split qualified names: missing intermediate qualifiers
//! become synthetic namespaces, promoted to classes when a class definition
//! for the same path shows up later. Members are grouped under their owning
//! compound and their links are remapped through the link map when one is
//! supplied.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::link_map::LinkMap;
use crate::model::{EntityId, EntityIndex, EntityKind, StructureError};
use crate::walk::{ItemSink, Walker};
use crate::xml::xml_escape;

/// Sentinel path emitted when a member's title is missing from the link map.
const LINK_NOT_FOUND: &str = "404";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Variable,
    Function,
    Class,
    Enum,
    Namespace,
}

/// One node of the rebuilt qualification tree.
struct Item {
    name: String,
    full_name: String,
    kind: ItemKind,
    link: String,
    members: BTreeMap<String, Item>,
}

impl Item {
    fn root() -> Item {
        Item {
            name: String::new(),
            full_name: String::new(),
            kind: ItemKind::Namespace,
            link: String::new(),
            members: BTreeMap::new(),
        }
    }
}

/// Doxygen-relevant kind of an index entity. Entities without a mapping
/// (constants, specializations, overloads) stay out of the tag file.
fn item_kind(kind: EntityKind) -> Option<ItemKind> {
    match kind {
        EntityKind::Function | EntityKind::Constructor | EntityKind::Destructor => {
            Some(ItemKind::Function)
        }
        EntityKind::Class | EntityKind::Typedef => Some(ItemKind::Class),
        EntityKind::Enum => Some(ItemKind::Enum),
        EntityKind::Variable => Some(ItemKind::Variable),
        EntityKind::Const
        | EntityKind::Specialization
        | EntityKind::Overload
        | EntityKind::Inherits => None,
    }
}

pub fn render(index: &EntityIndex, link_map: Option<&LinkMap>) -> Result<String, StructureError> {
    let mut sink = DoxygenSink { root: Item::root() };
    Walker::new(index).run(&mut sink)?;

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\" ?>\n");
    out.push_str("<tagfile>\n");
    print_map(&mut out, &sink.root, link_map);
    out.push_str("</tagfile>\n");
    Ok(out)
}

struct DoxygenSink {
    root: Item,
}

impl DoxygenSink {
    /// Inserts one resolved identifier into the qualification tree.
    fn add(&mut self, full_name: &str, full_link: &str, kind: ItemKind) {
        let mut parts: Vec<&str> = full_name.split("::").collect();
        let Some(last) = parts.pop() else { return };

        let mut curr = &mut self.root;
        let mut path = String::new();
        for part in parts {
            if !path.is_empty() {
                path.push_str("::");
            }
            path.push_str(part);

            curr = match curr.members.entry(part.to_string()) {
                Entry::Occupied(entry) => {
                    let item = entry.into_mut();
                    if !matches!(item.kind, ItemKind::Class | ItemKind::Namespace) {
                        log::warn!("{part} in {full_name} is not a class or namespace");
                        return;
                    }
                    item
                }
                // Missing intermediate qualifiers become namespaces and are
                // promoted to classes when a matching definition arrives.
                Entry::Vacant(entry) => entry.insert(Item {
                    name: part.to_string(),
                    full_name: path.clone(),
                    kind: ItemKind::Namespace,
                    link: String::new(),
                    members: BTreeMap::new(),
                }),
            };
        }

        match curr.members.entry(last.to_string()) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                if kind == ItemKind::Class
                    && matches!(existing.kind, ItemKind::Class | ItemKind::Namespace)
                {
                    // fix namespaces that are actually classes
                    existing.kind = ItemKind::Class;
                    existing.link = full_link.to_string();
                } else {
                    log::warn!("duplicate element: {full_name}");
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Item {
                    name: last.to_string(),
                    full_name: full_name.to_string(),
                    kind,
                    link: full_link.to_string(),
                    members: BTreeMap::new(),
                });
            }
        }
    }
}

impl ItemSink for DoxygenSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        if let Some(kind) = item_kind(walker.index().node(id).kind) {
            self.add(full_name, full_link, kind);
        }
        walker.process_children(self, id, full_name, full_link)
    }
}

fn print_map(out: &mut String, root: &Item, link_map: Option<&LinkMap>) {
    for item in root.members.values() {
        if matches!(item.kind, ItemKind::Namespace | ItemKind::Class) {
            print_compound(out, item, link_map);
        } else {
            log::warn!("{} ignored", item.full_name);
        }
    }
}

fn print_compound(out: &mut String, item: &Item, link_map: Option<&LinkMap>) {
    let compound_kind = match item.kind {
        ItemKind::Namespace => "namespace",
        ItemKind::Class => "class",
        _ => {
            log::warn!("only namespaces and classes can have members");
            return;
        }
    };

    out.push_str(&format!(
        "  <compound kind=\"{compound_kind}\">\n    <name>{}</name>\n    <filename>{}</filename>\n",
        xml_escape(&item.full_name),
        xml_escape(&item.link)
    ));
    print_members(out, item, link_map);
    out.push_str("  </compound>\n");

    for member in item.members.values() {
        if matches!(member.kind, ItemKind::Namespace | ItemKind::Class) {
            print_compound(out, member, link_map);
        }
    }
}

fn print_members(out: &mut String, item: &Item, link_map: Option<&LinkMap>) {
    for member in item.members.values() {
        let link = match link_map {
            Some(map) => match map.get(&member.link) {
                Some(path) => path.to_string(),
                None => {
                    if member.kind != ItemKind::Namespace {
                        log::warn!("{} contains invalid link", member.full_name);
                    }
                    LINK_NOT_FOUND.to_string()
                }
            },
            None => member.link.clone(),
        };

        match member.kind {
            ItemKind::Variable => out.push_str(&format!(
                "    <member kind=\"variable\">\n      <type>T</type>\n      <name>{}</name>\n      <anchorfile>{}</anchorfile>\n      <anchor></anchor>\n      <arglist></arglist>\n    </member>\n",
                xml_escape(&member.name),
                xml_escape(&link)
            )),
            ItemKind::Function => out.push_str(&format!(
                "    <member kind=\"function\">\n      <type>T</type>\n      <name>{}</name>\n      <anchorfile>{}</anchorfile>\n      <anchor></anchor>\n      <arglist>(T... args)</arglist>\n    </member>\n",
                xml_escape(&member.name),
                xml_escape(&link)
            )),
            ItemKind::Class => out.push_str(&format!(
                "    <class kind=\"class\">{}</class>\n",
                xml_escape(&member.full_name)
            )),
            ItemKind::Namespace => out.push_str(&format!(
                "    <namespace>{}</namespace>\n",
                xml_escape(&member.full_name)
            )),
            // the tag file has no representation for plain enums
            ItemKind::Enum => {}
        }
    }
}
