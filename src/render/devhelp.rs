//! DevHelp book output — a flat `<keyword>` stream inside a `<book>`
//! wrapper, with chapter structure supplied by the caller.

use crate::model::{EntityId, EntityIndex, EntityKind, StructureError};
use crate::walk::{ItemSink, Walker};
use crate::xml::xml_escape;

/// Book-level metadata for the DevHelp header.
pub struct BookMeta<'a> {
    pub title: &'a str,
    pub name: &'a str,
    pub base: &'a str,
    /// Link relative to the documentation root.
    pub rel_link: &'a str,
}

/// DevHelp keyword type string. The format has no marker for variables, so
/// those are emitted with an empty type rather than dropped.
fn keyword_type(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Const => "macro",
        EntityKind::Function => "function",
        EntityKind::Constructor => "function",
        EntityKind::Destructor => "function",
        EntityKind::Class => "class",
        EntityKind::Enum => "enum",
        EntityKind::Typedef => "typedef",
        EntityKind::Specialization => "class",
        EntityKind::Overload => "function",
        EntityKind::Variable => "",
        EntityKind::Inherits => "",
    }
}

pub fn render(
    index: &EntityIndex,
    book: &BookMeta<'_>,
    chapters: &str,
) -> Result<String, StructureError> {
    let mut out = format!(
        "<?xml version=\"1.0\"?>\n\
         <book title=\"{}\" xmlns=\"http://www.devhelp.net/book\" \
         name=\"{}\" base=\"{}\" link=\"{}\" version=\"2\" language=\"c++\">\n",
        xml_escape(book.title),
        xml_escape(book.name),
        xml_escape(book.base),
        xml_escape(book.rel_link)
    );
    out.push_str(chapters);
    out.push('\n');
    out.push_str("<functions>");

    let mut sink = DevhelpSink { out };
    Walker::new(index).run(&mut sink)?;
    let mut out = sink.out;

    out.push_str("\n  </functions>\n</book>\n");
    Ok(out)
}

struct DevhelpSink {
    out: String,
}

impl ItemSink for DevhelpSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        let kind = walker.index().node(id).kind;
        self.out.push_str(&format!(
            "<keyword type=\"{}\" name=\"{}\" link=\"{}\"/>\n",
            xml_escape(keyword_type(kind)),
            xml_escape(full_name),
            xml_escape(full_link)
        ));
        walker.process_children(self, id, full_name, full_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_index;

    fn book() -> BookMeta<'static> {
        BookMeta {
            title: "C++ Standard Library reference",
            name: "cppreference-doc-en-cpp",
            base: "/usr/share/doc/cppreference",
            rel_link: "en/cpp.html",
        }
    }

    #[test]
    fn wraps_keywords_in_book() {
        let index = parse_index(
            r#"<index>
                 <const name="NULL" link="types/NULL"/>
                 <class name="std::vector" link="container/vector">
                   <function name="size"/>
                   <variable name="x"/>
                 </class>
               </index>"#,
        )
        .unwrap();
        let out = render(&index, &book(), "<chapters/>").unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\"?>\n<book title=\"C++ Standard Library reference\""));
        assert!(out.contains("<chapters/>\n<functions>"));
        assert!(out.contains(
            "<keyword type=\"macro\" name=\"NULL\" link=\"types/NULL\"/>"
        ));
        assert!(out.contains(
            "<keyword type=\"function\" name=\"std::vector::size\" link=\"container/vector/size\"/>"
        ));
        // variables have no DevHelp type
        assert!(out.contains(
            "<keyword type=\"\" name=\"std::vector::x\" link=\"container/vector/x\"/>"
        ));
        assert!(out.trim_end().ends_with("</functions>\n</book>"));
    }
}
