//! Highlight candidate list — top-level identifiers suitable for syntax
//! highlighting definitions.
//!
//! Same `name => link` shape as the search list, but class members and
//! template/overload punctuation are dropped, and the inheritance hierarchy
//! is never walked: a derived class must not re-list its base's members.

use crate::model::{EntityId, EntityIndex, EntityKind, StructureError};
use crate::walk::{ItemSink, WalkOptions, Walker};

pub fn render(index: &EntityIndex) -> Result<String, StructureError> {
    let mut sink = HighlightSink::default();
    let opts = WalkOptions {
        expand_typedefs: true,
        expand_inherits: false,
    };
    Walker::with_options(index, opts).run(&mut sink)?;
    Ok(sink.out)
}

#[derive(Default)]
struct HighlightSink {
    out: String,
}

/// Functions, variables, constructors and destructors below a class are
/// member entities; everything at the top level is not.
fn is_member(index: &EntityIndex, id: EntityId) -> bool {
    if index.node(id).parent.is_none() {
        return false;
    }
    matches!(
        index.node(id).kind,
        EntityKind::Function
            | EntityKind::Variable
            | EntityKind::Constructor
            | EntityKind::Destructor
    )
}

impl ItemSink for HighlightSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        let punctuated = full_name.contains(['<', '>', '(', ')']);
        if !is_member(walker.index(), id) && !punctuated {
            self.out.push_str(full_name);
            self.out.push_str(" => ");
            self.out.push_str(full_link);
            self.out.push('\n');
        }
        walker.process_children(self, id, full_name, full_link)
    }
}
