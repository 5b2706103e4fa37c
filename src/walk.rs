//! Index traversal engine.
//!
//! A depth-first walk over the entity tree that resolves every node's
//! qualified name and link, then hands the node to an [`ItemSink`]. Sinks
//! decide what to do with each resolved identifier and whether to descend:
//! recursion happens when a sink calls [`Walker::process_children`] from its
//! hook, so a sink can emit wrapping output around its subtree.
//!
//! Two traversal modes exist beyond plain children: alias typedefs expand
//! the members of the type they alias (reparented under the typedef), and
//! `inherits` references pull the members of base classes into the derived
//! class. Both can be disabled per walk via [`WalkOptions`].

use std::collections::VecDeque;

use crate::model::{EntityId, EntityIndex, EntityKind, StructureError};
use crate::resolve;

/// Per-item hook invoked with the resolved identity of every visited entity.
///
/// Implementations that want the default deep traversal call
/// `walker.process_children(self, id, full_name, full_link)` before
/// returning; leaving it out prunes the subtree.
pub trait ItemSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError>;
}

/// Traversal configuration.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Expand members of aliased types under their typedefs.
    pub expand_typedefs: bool,
    /// Expand inherited members into derived classes.
    pub expand_inherits: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        WalkOptions {
            expand_typedefs: true,
            expand_inherits: true,
        }
    }
}

pub struct Walker<'a> {
    index: &'a EntityIndex,
    opts: WalkOptions,
}

impl<'a> Walker<'a> {
    pub fn new(index: &'a EntityIndex) -> Self {
        Walker {
            index,
            opts: WalkOptions::default(),
        }
    }

    pub fn with_options(index: &'a EntityIndex, opts: WalkOptions) -> Self {
        Walker { index, opts }
    }

    pub fn index(&self) -> &EntityIndex {
        self.index
    }

    /// Walks every top-level entity with an empty parent context.
    pub fn run<S: ItemSink>(&self, sink: &mut S) -> Result<(), StructureError> {
        for &id in self.index.top_level() {
            self.process_item(sink, id, "", "")?;
        }
        Ok(())
    }

    /// Resolves one node and dispatches it to the sink. The first `inherits`
    /// sibling triggers inheritance expansion for the whole sibling group;
    /// the remaining `inherits` nodes are consumed by that expansion.
    pub fn process_item<S: ItemSink>(
        &self,
        sink: &mut S,
        id: EntityId,
        parent_name: &str,
        parent_link: &str,
    ) -> Result<(), StructureError> {
        let node = self.index.node(id);

        if node.kind.is_nameable() {
            let full_name = resolve::full_name(self.index, id, parent_name)?;
            let full_link = resolve::full_link(self.index, id, parent_link)?;
            return sink.on_item(self, id, &full_name, &full_link);
        }

        // kind == inherits
        if !self.opts.expand_inherits {
            return Ok(());
        }
        let inherits: Vec<EntityId> = self
            .index
            .siblings(id)
            .iter()
            .copied()
            .filter(|&s| self.index.node(s).kind == EntityKind::Inherits)
            .collect();
        if inherits.first() == Some(&id) {
            self.inherits_worker(sink, parent_name, inherits.into())?;
        }
        Ok(())
    }

    /// Recurses into the children of a resolved node. Classes and enums
    /// descend directly; alias typedefs descend into the aliased type's
    /// children, reparented under the typedef's own name.
    pub fn process_children<S: ItemSink>(
        &self,
        sink: &mut S,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        let node = self.index.node(id);
        match node.kind {
            EntityKind::Class | EntityKind::Enum => {
                for &child in &node.children {
                    self.process_item(sink, child, full_name, full_link)?;
                }
                Ok(())
            }
            EntityKind::Typedef => {
                if !self.opts.expand_typedefs {
                    return Ok(());
                }
                let Some(alias) = &node.alias else {
                    return Ok(());
                };
                let target = self.index.find_alias(alias)?;
                let link = resolve::own_link(self.index, target)?;
                for &child in &self.index.node(target).children {
                    self.process_item(sink, child, full_name, &link)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Pulls the members of inherited classes into the inheriting class.
    ///
    /// Worklist of `inherits` references plus a finished-set keyed by node
    /// identity: each base class is expanded at most once no matter how
    /// many inheritance paths reach it, and its own `inherits` references
    /// are enqueued only on that first expansion, so inheritance cycles
    /// terminate.
    fn inherits_worker<S: ItemSink>(
        &self,
        sink: &mut S,
        parent_name: &str,
        mut pending: VecDeque<EntityId>,
    ) -> Result<(), StructureError> {
        let mut finished: Vec<EntityId> = Vec::new();

        while let Some(current) = pending.pop_front() {
            let source = self.index.find_alias(self.index.name(current)?)?;
            if finished.contains(&source) {
                continue;
            }
            finished.push(source);

            let parent_link = self.index.required_link(source)?;
            for &child in &self.index.node(source).children {
                let ch = self.index.node(child);
                // Members that are never inherited.
                if matches!(
                    ch.kind,
                    EntityKind::Constructor
                        | EntityKind::Destructor
                        | EntityKind::Inherits
                        | EntityKind::Specialization
                        | EntityKind::Overload
                ) {
                    continue;
                }
                if ch.kind == EntityKind::Function && ch.name.as_deref() == Some("operator=") {
                    continue;
                }
                self.process_item(sink, child, parent_name, parent_link)?;
            }

            for &child in &self.index.node(source).children {
                if self.index.node(child).kind == EntityKind::Inherits && child != current {
                    pending.push_back(child);
                }
            }
        }
        Ok(())
    }
}
