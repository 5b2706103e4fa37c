//! Search list output — one `name => link` line per identifier.

use crate::model::{EntityId, EntityIndex, StructureError};
use crate::walk::{ItemSink, Walker};

pub fn render(index: &EntityIndex) -> Result<String, StructureError> {
    let mut sink = SearchSink::default();
    Walker::new(index).run(&mut sink)?;
    Ok(sink.out)
}

#[derive(Default)]
struct SearchSink {
    out: String,
}

impl ItemSink for SearchSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        self.out.push_str(full_name);
        self.out.push_str(" => ");
        self.out.push_str(full_link);
        self.out.push('\n');
        walker.process_children(self, id, full_name, full_link)
    }
}
