//! Document arena and tree operations.

use super::mutation::{
    MutationKind,
    MutationRecord,
    ObserverConfig,
    ObserverEntry,
    ObserverId,
};
use super::node::{
    ElementData,
    FragmentNode,
    Node,
    NodeData,
    NodeId,
};
use super::{
    DomError,
    parser,
};

/// A DOM event delivered to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub name: String,
    pub bubbles: bool,
    pub cancelable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: NodeId,
    pub event: DomEvent,
}

/// A document: the node arena, observer registrations and dispatched events.
///
/// Nodes are never freed: a [`NodeId`] stays valid for the lifetime of the
/// document, detached or not. Overlays reuse existing nodes where they can,
/// so retranslating plain text does not grow the arena.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    observers: Vec<ObserverEntry>,
    events: Vec<DispatchedEvent>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// The document node.
    pub const ROOT: NodeId = NodeId(0);

    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![Node::new(NodeData::Document)], observers: Vec::new(), events: Vec::new() }
    }

    /// Number of nodes ever allocated, detached ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Parses an HTML document.
    ///
    /// # Errors
    /// Returns [`DomError::Parse`] when the parser cannot be set up.
    pub fn parse_html(source: &str) -> Result<Self, DomError> {
        let nodes = parser::parse_fragment(source)?;
        let mut document = Self::new();
        document.append_fragment(Self::ROOT, nodes)?;
        Ok(document)
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.index()).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.index()).ok_or(DomError::NodeNotFound(id))
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.index())?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn insert(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert(NodeData::Element(ElementData::new(tag)))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(NodeData::Text(text.into()))
    }

    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index()).map(|node| &node.data)
    }

    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|node| node.parent)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.index()).map_or(&[], |node| node.children.as_slice())
    }

    /// Element children of `id`, in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(|child| self.is_element(*child))
    }

    #[must_use]
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attr(name))
    }

    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        self.element(id).map_or(&[], |element| element.attrs.as_slice())
    }

    /// # Errors
    /// Fails when `id` is missing or not an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let NodeData::Element(element) = &mut self.node_mut(id)?.data else {
            return Err(DomError::NotAnElement(id));
        };
        let old_value = match element.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, current)) => Some(std::mem::replace(current, value.to_string())),
            None => {
                element.attrs.push((name.to_string(), value.to_string()));
                None
            }
        };
        self.queue_record(MutationRecord {
            target: id,
            kind: MutationKind::Attributes { name: name.to_string(), old_value },
        });
        Ok(())
    }

    /// Removes an attribute, returning its previous value.
    ///
    /// # Errors
    /// Fails when `id` is missing or not an element.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let NodeData::Element(element) = &mut self.node_mut(id)?.data else {
            return Err(DomError::NotAnElement(id));
        };
        let Some(position) = element.attrs.iter().position(|(n, _)| n == name) else {
            return Ok(None);
        };
        let (_, old_value) = element.attrs.remove(position);
        self.queue_record(MutationRecord {
            target: id,
            kind: MutationKind::Attributes {
                name: name.to_string(),
                old_value: Some(old_value.clone()),
            },
        });
        Ok(Some(old_value))
    }

    /// Appends `child` to `parent`, moving it out of its current parent.
    ///
    /// # Errors
    /// Fails when either node is missing, `parent` is a text node or `child`
    /// is an ancestor of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.queue_record(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList { added: vec![child], removed: Vec::new() },
        });
        Ok(())
    }

    /// Removes `id` from its parent. Detached nodes are left untouched.
    ///
    /// # Errors
    /// Fails when `id` is missing.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|child| *child != id);
        self.node_mut(id)?.parent = None;
        self.queue_record(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList { added: Vec::new(), removed: vec![id] },
        });
        Ok(())
    }

    /// Clears `parent` and appends `children` in order.
    ///
    /// Nodes in `children` may already be children of `parent` (they are
    /// re-attached with the same identity) or of another parent (they are moved).
    ///
    /// # Errors
    /// Fails when a node is missing or a child is an ancestor of `parent`.
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<(), DomError> {
        for child in &children {
            self.check_insertion(parent, *child)?;
        }
        let removed = std::mem::take(&mut self.node_mut(parent)?.children);
        for old in &removed {
            self.node_mut(*old)?.parent = None;
        }
        for child in &children {
            self.detach(*child)?;
            self.node_mut(*child)?.parent = Some(parent);
        }
        self.node_mut(parent)?.children.clone_from(&children);
        self.queue_record(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList { added: children, removed },
        });
        Ok(())
    }

    /// Replaces all children of `id` with a single text node.
    ///
    /// When the only child already is a text node, its text is updated in
    /// place and no node is allocated.
    ///
    /// # Errors
    /// Fails when `id` is missing or is itself a text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        let lone_text = match self.node(id)?.children.as_slice() {
            [only] if !text.is_empty() && matches!(self.data(*only), Some(NodeData::Text(_))) => Some(*only),
            _ => None,
        };
        if let Some(child) = lone_text
            && let NodeData::Text(current) = &mut self.node_mut(child)?.data
        {
            text.clone_into(current);
            return Ok(());
        }

        let children = if text.is_empty() { Vec::new() } else { vec![self.create_text(text)] };
        self.replace_children(id, children)
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeData::Text(text)) = self.data(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(NodeData::Text(text)) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Descendants of `id` in document order, `id` excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(Self::ROOT, id)
    }

    /// Descendant elements of `root` carrying `attribute`, in document order.
    #[must_use]
    pub fn query_attribute(&self, root: NodeId, attribute: &str) -> Vec<NodeId> {
        self.descendants(root).into_iter().filter(|id| self.has_attribute(*id, attribute)).collect()
    }

    /// Descendant elements of `root` with the given tag, in document order.
    #[must_use]
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root).into_iter().filter(|id| self.tag_name(*id) == Some(tag)).collect()
    }

    /// The first element child of the document node.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(Self::ROOT).next()
    }

    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.elements_by_tag(Self::ROOT, "head").into_iter().next()
    }

    /// Builds document nodes from a parsed fragment and appends them to `parent`.
    ///
    /// # Errors
    /// Fails when `parent` is missing.
    pub fn append_fragment(
        &mut self,
        parent: NodeId,
        nodes: Vec<FragmentNode>,
    ) -> Result<Vec<NodeId>, DomError> {
        let mut appended = Vec::with_capacity(nodes.len());
        for node in nodes {
            let id = match node {
                FragmentNode::Text(text) => self.create_text(text),
                FragmentNode::Element(element) => {
                    let id = self.insert(NodeData::Element(ElementData {
                        tag: element.tag,
                        attrs: element.attrs,
                    }));
                    self.append_fragment(id, element.children)?;
                    id
                }
            };
            self.append_child(parent, id)?;
            appended.push(id);
        }
        Ok(appended)
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_is_text = matches!(self.node(parent)?.data, NodeData::Text(_));
        self.node(child)?;
        if parent_is_text || child == Self::ROOT || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Records an event dispatched to `target`.
    pub fn dispatch_event(&mut self, target: NodeId, event: DomEvent) {
        tracing::debug!(?target, name = %event.name, "Dispatching event");
        self.events.push(DispatchedEvent { target, event });
    }

    /// Drains the events dispatched so far.
    pub fn take_events(&mut self) -> Vec<DispatchedEvent> {
        std::mem::take(&mut self.events)
    }

    /// Registers a new observer without any observed roots.
    pub fn new_observer(&mut self) -> ObserverId {
        self.observers.push(ObserverEntry::default());
        ObserverId(self.observers.len() - 1)
    }

    /// Observes `root` for `observer`; observing a root again replaces its
    /// configuration.
    pub fn observe(&mut self, observer: ObserverId, root: NodeId, config: ObserverConfig) {
        let Some(entry) = self.observers.get_mut(observer.0) else {
            return;
        };
        match entry.registrations.iter_mut().find(|(r, _)| *r == root) {
            Some((_, current)) => *current = config,
            None => entry.registrations.push((root, config)),
        }
    }

    pub fn unobserve(&mut self, observer: ObserverId, root: NodeId) {
        if let Some(entry) = self.observers.get_mut(observer.0) {
            entry.registrations.retain(|(r, _)| *r != root);
        }
    }

    /// Stops recording for every root of `observer`; queued records are kept.
    pub fn unobserve_all(&mut self, observer: ObserverId) {
        if let Some(entry) = self.observers.get_mut(observer.0) {
            entry.registrations.clear();
        }
    }

    /// Drains the records queued for `observer`.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers.get_mut(observer.0).map(|entry| std::mem::take(&mut entry.queue)).unwrap_or_default()
    }

    #[must_use]
    pub fn pending_records(&self, observer: ObserverId) -> usize {
        self.observers.get(observer.0).map_or(0, |entry| entry.queue.len())
    }

    fn queue_record(&mut self, record: MutationRecord) {
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry.registrations.iter().any(|(root, config)| {
                    config.accepts(&record)
                        && if config.subtree {
                            self.contains(*root, record.target)
                        } else {
                            *root == record.target
                        }
                })
            })
            .map(|(index, _)| index)
            .collect();
        for index in interested {
            if let Some(entry) = self.observers.get_mut(index) {
                entry.queue.push(record.clone());
            }
        }
    }
}
