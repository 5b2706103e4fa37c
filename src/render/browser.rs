//! Browser tree output — a standalone HTML page with the whole identifier
//! hierarchy as nested lists.

use crate::model::{EntityId, EntityIndex, EntityKind, StructureError};
use crate::walk::{ItemSink, Walker};
use crate::xml::xml_escape;

const PAGE_HEAD: &str = "\
<html>
  <head>
  <style type=\"text/css\">
    body {
      font-size: 0.8em;
    }

    .link a {
      font-size: 0.8em;
      color: #808080;
    }
    .mark {
      font-size: 0.8em;
      color: #008000;
    }
  </style>
  </head>
  <body>
    <ul>
";

const PAGE_FOOT: &str = "
    </ul>
  </body>
</html>
";

pub fn render(index: &EntityIndex) -> Result<String, StructureError> {
    let mut sink = BrowserSink {
        out: String::from(PAGE_HEAD),
    };
    Walker::new(index).run(&mut sink)?;
    sink.out.push_str(PAGE_FOOT);
    Ok(sink.out)
}

/// Human-readable kind marker. Constructors, destructors and overloads are
/// presented as functions, specializations as classes.
fn kind_mark(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Const => "(const)",
        EntityKind::Function => "(function)",
        EntityKind::Constructor => "(function)",
        EntityKind::Destructor => "(function)",
        EntityKind::Class => "(class)",
        EntityKind::Enum => "(enum)",
        EntityKind::Variable => "(variable)",
        EntityKind::Typedef => "(typedef)",
        EntityKind::Specialization => "(class)",
        EntityKind::Overload => "(function)",
        EntityKind::Inherits => "",
    }
}

fn item_html(kind: EntityKind, full_name: &str, full_link: &str) -> String {
    format!(
        "<tt><b>{}</b></tt> [<span class=\"link\">\
         <a href=\"http://en.cppreference.com/w/{}\">{}</a></span>] \
         <span class=\"mark\">{}</span>\n",
        xml_escape(full_name),
        xml_escape(full_link),
        full_link,
        kind_mark(kind)
    )
}

struct BrowserSink {
    out: String,
}

impl ItemSink for BrowserSink {
    fn on_item(
        &mut self,
        walker: &Walker,
        id: EntityId,
        full_name: &str,
        full_link: &str,
    ) -> Result<(), StructureError> {
        let kind = walker.index().node(id).kind;
        self.out.push_str("<li>");
        self.out.push_str(&item_html(kind, full_name, full_link));
        self.out.push_str("<ul>");
        walker.process_children(self, id, full_name, full_link)?;
        self.out.push_str("</ul></li>\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_index;

    #[test]
    fn nests_members_below_their_class() {
        let index = parse_index(
            r#"<index>
                 <class name="std::vector" link="container/vector">
                   <function name="size"/>
                 </class>
               </index>"#,
        )
        .unwrap();
        let out = render(&index).unwrap();

        let class_pos = out.find("<tt><b>std::vector</b></tt>").unwrap();
        let member_pos = out.find("<tt><b>std::vector::size</b></tt>").unwrap();
        assert!(class_pos < member_pos);
        assert!(out.contains(
            "<a href=\"http://en.cppreference.com/w/container/vector/size\">container/vector/size</a>"
        ));
        assert!(out.starts_with("<html>"));
        assert!(out.trim_end().ends_with("</html>"));
    }

    #[test]
    fn marks_follow_entity_kind() {
        let index = parse_index(
            r#"<index>
                 <class name="c" link="c">
                   <constructor/>
                   <enum name="e" link="e"/>
                 </class>
               </index>"#,
        )
        .unwrap();
        let out = render(&index).unwrap();
        assert!(out.contains("<tt><b>c::c</b></tt>"));
        assert!(out.contains("<span class=\"mark\">(function)</span>"));
        assert!(out.contains("<span class=\"mark\">(enum)</span>"));
        assert!(out.contains("<span class=\"mark\">(class)</span>"));
    }

    #[test]
    fn escapes_operator_names() {
        let index = parse_index(
            r#"<index>
                 <class name="c" link="c">
                   <function name="operator&lt;&lt;" link="operator_ltlt"/>
                 </class>
               </index>"#,
        )
        .unwrap();
        let out = render(&index).unwrap();
        assert!(out.contains("<tt><b>c::operator&lt;&lt;</b></tt>"));
    }
}
