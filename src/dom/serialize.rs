//! HTML serializer.

use super::node::{
    NodeData,
    NodeId,
    RAW_TEXT_ELEMENTS,
    VOID_ELEMENTS,
};
use super::Document;

impl Document {
    /// Serializes the children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let raw = self.tag_name(id).is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
        for child in self.children(id) {
            self.write_node(*child, raw, &mut out);
        }
        out
    }

    /// Serializes `id` itself and its subtree.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, false, &mut out);
        out
    }

    /// Serializes the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.inner_html(Self::ROOT)
    }

    fn write_node(&self, id: NodeId, raw_text: bool, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Text(text)) if raw_text => out.push_str(text),
            Some(NodeData::Text(text)) => escape_into(text, false, out),
            Some(NodeData::Element(element)) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    return;
                }
                out.push_str(&self.inner_html(id));
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
            Some(NodeData::Document) => out.push_str(&self.inner_html(id)),
            None => {}
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("<p>Hello</p>")]
    #[case::attributes(r#"<p title="a &amp; &quot;b&quot;">x</p>"#)]
    #[case::void("<p>one<br>two</p>")]
    #[case::escaped_text("<p>1 &lt; 2</p>")]
    #[case::script("<script>if (a < b) {}</script>")]
    fn test_serialize_reparses_to_same_markup(#[case] html: &str) {
        let doc = Document::parse_html(html).unwrap();

        assert_eq!(doc.to_html(), html);
    }

    #[rstest]
    fn inner_html_excludes_the_element() {
        let doc = Document::parse_html("<div><b>bold</b> text</div>").unwrap();
        let div = doc.document_element().unwrap();

        assert_eq!(doc.inner_html(div), "<b>bold</b> text");
        assert_eq!(doc.outer_html(div), "<div><b>bold</b> text</div>");
    }
}
