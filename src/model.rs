//! Entity tree model — the in-memory form of the identifier index.
//!
//! The index document is a shallow hierarchy: top-level classes, enums,
//! functions and constants, with member entities nested below classes and
//! enums. Nodes are stored in an arena and addressed by [`EntityId`] so that
//! parent back-references and node identity (needed for diamond-inheritance
//! deduplication) come for free.

use std::fmt;
use thiserror::Error;

/// Structural problems in the index document. These abort processing of the
/// enclosing document; they are never recovered per-item.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("failed to parse index document: {0}")]
    Parse(String),

    #[error("element '{kind}' does not have attribute '{attr}'{context}")]
    MissingAttribute {
        kind: EntityKind,
        attr: &'static str,
        /// `" ( name: ... )"` when the element has a name, empty otherwise.
        context: String,
    },

    #[error("element '{0}' does not have a parent")]
    MissingParent(EntityKind),

    #[error("no alias target found for '{0}'")]
    AliasNotFound(String),

    #[error("more than one alias target found for '{0}'")]
    AliasAmbiguous(String),
}

/// Kind of a documented entity, matching the element names of the index
/// document one to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Const,
    Function,
    Class,
    Enum,
    Variable,
    Typedef,
    Constructor,
    Destructor,
    Specialization,
    Overload,
    Inherits,
}

impl EntityKind {
    /// Maps an index element name to a kind. Unknown element names are the
    /// caller's problem (skipped with a warning during parsing).
    pub fn from_tag(tag: &str) -> Option<EntityKind> {
        match tag {
            "const" => Some(EntityKind::Const),
            "function" => Some(EntityKind::Function),
            "class" => Some(EntityKind::Class),
            "enum" => Some(EntityKind::Enum),
            "variable" => Some(EntityKind::Variable),
            "typedef" => Some(EntityKind::Typedef),
            "constructor" => Some(EntityKind::Constructor),
            "destructor" => Some(EntityKind::Destructor),
            "specialization" => Some(EntityKind::Specialization),
            "overload" => Some(EntityKind::Overload),
            "inherits" => Some(EntityKind::Inherits),
            _ => None,
        }
    }

    /// Element name, for diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Const => "const",
            EntityKind::Function => "function",
            EntityKind::Class => "class",
            EntityKind::Enum => "enum",
            EntityKind::Variable => "variable",
            EntityKind::Typedef => "typedef",
            EntityKind::Constructor => "constructor",
            EntityKind::Destructor => "destructor",
            EntityKind::Specialization => "specialization",
            EntityKind::Overload => "overload",
            EntityKind::Inherits => "inherits",
        }
    }

    /// True for kinds that produce a resolved `(name, link)` pair.
    /// `inherits` edges are traversal instructions, not entities.
    pub fn is_nameable(&self) -> bool {
        !matches!(self, EntityKind::Inherits)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Arena handle for one entity node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub(crate) usize);

/// One node of the entity tree.
#[derive(Debug)]
pub struct Entity {
    pub kind: EntityKind,
    /// Local (unqualified) identifier. Constructors and destructors carry
    /// none; `inherits` names the referenced base class.
    pub name: Option<String>,
    /// Relative link fragment. Absent means "derive from name"; `.` means
    /// "defined inline on the parent's page".
    pub link: Option<String>,
    /// Typedef only: name of the class/enum this typedef pulls members from.
    pub alias: Option<String>,
    pub parent: Option<EntityId>,
    pub children: Vec<EntityId>,
}

/// The parsed index: an arena of nodes plus the ordered top-level entities.
#[derive(Debug, Default)]
pub struct EntityIndex {
    nodes: Vec<Entity>,
    top: Vec<EntityId>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.nodes.len());
        let parent = entity.parent;
        self.nodes.push(entity);
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.top.push(id),
        }
        id
    }

    pub fn node(&self, id: EntityId) -> &Entity {
        &self.nodes[id.0]
    }

    /// Top-level entities in document order.
    pub fn top_level(&self) -> &[EntityId] {
        &self.top
    }

    /// Sibling list of `id`: the parent's children, or the top-level list
    /// for nodes directly below the index root.
    pub fn siblings(&self, id: EntityId) -> &[EntityId] {
        match self.node(id).parent {
            Some(p) => &self.node(p).children,
            None => &self.top,
        }
    }

    /// The `name` attribute, or a structural error naming the element.
    pub fn name(&self, id: EntityId) -> Result<&str, StructureError> {
        self.attr(id, "name")
    }

    fn attr(&self, id: EntityId, attr: &'static str) -> Result<&str, StructureError> {
        let node = self.node(id);
        let value = match attr {
            "name" => node.name.as_deref(),
            "link" => node.link.as_deref(),
            _ => None,
        };
        value.ok_or_else(|| StructureError::MissingAttribute {
            kind: node.kind,
            attr,
            context: match &node.name {
                Some(name) => format!(" ( name: {name} )"),
                None => String::new(),
            },
        })
    }

    /// The `link` attribute, required. Used by inheritance expansion, where
    /// a source class without an explicit link is a malformed document.
    pub fn required_link(&self, id: EntityId) -> Result<&str, StructureError> {
        self.attr(id, "link")
    }

    /// Finds the top-level class/enum named `name`. Zero or multiple
    /// matches are structural errors; ambiguous documents must not be
    /// resolved by guessing.
    pub fn find_alias(&self, name: &str) -> Result<EntityId, StructureError> {
        let mut found = None;
        for &id in &self.top {
            let node = self.node(id);
            if !matches!(node.kind, EntityKind::Class | EntityKind::Enum) {
                continue;
            }
            if node.name.as_deref() == Some(name) {
                if found.is_some() {
                    return Err(StructureError::AliasAmbiguous(name.to_string()));
                }
                found = Some(id);
            }
        }
        found.ok_or_else(|| StructureError::AliasNotFound(name.to_string()))
    }
}
