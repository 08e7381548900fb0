//! Node and fragment types.

/// Handle to a node in a [`Document`](super::Document) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) u32);

impl NodeId {
    pub(super) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Elements that never have children.
pub(super) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is text and never markup.
pub(super) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_ascii_lowercase(), attrs: Vec::new() }
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub(super) struct Node {
    pub(super) data: NodeData,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Node {
    pub(super) const fn new(data: NodeData) -> Self {
        Self { data, parent: None, children: Vec::new() }
    }
}

/// Detached, inert markup tree produced by the parser.
///
/// Nothing in a fragment is live: it is consumed node by node when merged
/// into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentNode {
    Text(String),
    Element(FragmentElement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<FragmentNode>,
}

impl FragmentNode {
    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(element) => {
                for child in &element.children {
                    child.push_text(out);
                }
            }
        }
    }
}
