//! Mutation-driven retranslation.
//!
//! The observer watches registered roots for new or re-keyed translatable
//! elements. While translations are being applied it is suspended, so the
//! overlay's own writes never come back as work.

use std::collections::HashSet;

use crate::dom::{
    Document,
    MutationKind,
    MutationRecord,
    NodeId,
    ObserverConfig,
    ObserverId,
};
use crate::types::{
    L10N_ARGS_ATTR,
    L10N_ID_ATTR,
};

/// Observation of the roots of one controller.
#[derive(Debug)]
pub struct RetranslationObserver {
    id: ObserverId,
    /// Registered roots, in registration order.
    roots: Vec<NodeId>,
    /// Nesting depth of `pause` calls.
    suppression: usize,
}

impl RetranslationObserver {
    /// Registers a new observer with `doc`. No root is observed yet.
    pub fn new(doc: &mut Document) -> Self {
        Self { id: doc.new_observer(), roots: Vec::new(), suppression: 0 }
    }

    /// Attribute changes to the l10n attributes and child-list changes, on
    /// whole subtrees.
    #[must_use]
    pub fn config() -> ObserverConfig {
        ObserverConfig {
            attributes: true,
            child_list: true,
            subtree: true,
            attribute_filter: Some(vec![L10N_ID_ATTR.to_string(), L10N_ARGS_ATTR.to_string()]),
        }
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.suppression > 0
    }

    /// Adds `root`. While paused, observation starts on resume.
    pub fn observe_root(&mut self, doc: &mut Document, root: NodeId) {
        if !self.roots.contains(&root) {
            self.roots.push(root);
        }
        if !self.is_paused() {
            doc.observe(self.id, root, Self::config());
        }
    }

    /// Removes `root`; the other roots stay observed.
    pub fn disconnect_root(&mut self, doc: &mut Document, root: NodeId) {
        self.roots.retain(|r| *r != root);
        doc.unobserve(self.id, root);
    }

    /// Stops observing every root. Nested calls only deepen the suspension.
    pub fn pause(&mut self, doc: &mut Document) {
        if self.suppression == 0 {
            doc.unobserve_all(self.id);
        }
        self.suppression += 1;
    }

    /// Undoes one `pause`. The outermost resume observes the roots registered
    /// at that moment.
    pub fn resume(&mut self, doc: &mut Document) {
        self.suppression = self.suppression.saturating_sub(1);
        if self.suppression == 0 {
            for root in &self.roots {
                doc.observe(self.id, *root, Self::config());
            }
        }
    }

    /// Drains the mutation records queued so far.
    pub fn take_records(&self, doc: &mut Document) -> Vec<MutationRecord> {
        doc.take_records(self.id)
    }
}

/// Elements that need translating after `records`, deduplicated, in first-seen
/// order.
///
/// Attribute changes count when the target still has an id. Each added element
/// contributes itself (when translatable) and its translatable descendants.
#[must_use]
pub fn collect_targets(doc: &Document, records: &[MutationRecord]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    let mut push = |id: NodeId| {
        if seen.insert(id) {
            targets.push(id);
        }
    };

    for record in records {
        match &record.kind {
            MutationKind::Attributes { name, .. } => {
                if (name == L10N_ID_ATTR || name == L10N_ARGS_ATTR)
                    && doc.has_attribute(record.target, L10N_ID_ATTR)
                {
                    push(record.target);
                }
            }
            MutationKind::ChildList { added, .. } => {
                for node in added.iter().filter(|node| doc.is_element(**node)) {
                    if doc.has_attribute(*node, L10N_ID_ATTR) {
                        push(*node);
                    }
                    for descendant in doc.query_attribute(*node, L10N_ID_ATTR) {
                        push(descendant);
                    }
                }
            }
        }
    }
    targets
}

/// Translatable descendants of `root` in document order, then `root` itself
/// if it is translatable.
#[must_use]
pub fn get_translatables(doc: &Document, root: NodeId) -> Vec<NodeId> {
    let mut nodes = doc.query_attribute(root, L10N_ID_ATTR);
    if doc.has_attribute(root, L10N_ID_ATTR) {
        nodes.push(root);
    }
    nodes
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    fn setup(html: &str) -> (Document, RetranslationObserver) {
        let mut doc = Document::parse_html(html).unwrap();
        let mut observer = RetranslationObserver::new(&mut doc);
        observer.observe_root(&mut doc, Document::ROOT);
        (doc, observer)
    }

    fn body(doc: &Document) -> NodeId {
        doc.elements_by_tag(Document::ROOT, "body")[0]
    }

    #[googletest::test]
    fn translatables_put_root_last() {
        let doc = Document::parse_html(
            r#"<div data-l10n-id="outer"><p data-l10n-id="a"></p><p></p><b data-l10n-id="b"></b></div>"#,
        )
        .unwrap();
        let div = doc.document_element().unwrap();

        let ids: Vec<_> = get_translatables(&doc, div)
            .into_iter()
            .filter_map(|id| doc.get_attribute(id, L10N_ID_ATTR).map(ToString::to_string))
            .collect();

        expect_that!(ids, elements_are![eq("a"), eq("b"), eq("outer")]);
    }

    #[googletest::test]
    fn other_attributes_produce_no_targets() {
        let (mut doc, observer) = setup(r#"<body><p data-l10n-id="x"></p></body>"#);
        let p = doc.elements_by_tag(Document::ROOT, "p")[0];

        doc.set_attribute(p, "class", "big").unwrap();
        doc.set_attribute(p, "title", "t").unwrap();

        let records = observer.take_records(&mut doc);
        expect_that!(records, is_empty());
        expect_that!(collect_targets(&doc, &records), is_empty());
    }

    #[googletest::test]
    fn attribute_changes_target_the_element_once() {
        let (mut doc, observer) = setup("<body><p></p></body>");
        let p = doc.elements_by_tag(Document::ROOT, "p")[0];

        doc.set_attribute(p, L10N_ID_ATTR, "greet").unwrap();
        doc.set_attribute(p, L10N_ARGS_ATTR, r#"{"name":"Ana"}"#).unwrap();

        let records = observer.take_records(&mut doc);
        expect_that!(records.len(), eq(2));
        expect_that!(collect_targets(&doc, &records), elements_are![eq(&p)]);
    }

    #[googletest::test]
    fn removed_id_is_not_a_target() {
        let (mut doc, observer) = setup(r#"<body><p data-l10n-id="x"></p></body>"#);
        let p = doc.elements_by_tag(Document::ROOT, "p")[0];

        doc.remove_attribute(p, L10N_ID_ATTR).unwrap();

        let records = observer.take_records(&mut doc);
        expect_that!(records.len(), eq(1));
        expect_that!(collect_targets(&doc, &records), is_empty());
    }

    #[googletest::test]
    fn added_subtrees_contribute_translatable_nodes() {
        let (mut doc, observer) = setup("<body></body>");
        let body = body(&doc);
        let section = doc.create_element("section");
        doc.set_attribute(section, L10N_ID_ATTR, "section").unwrap();
        let inner = doc.create_element("p");
        doc.set_attribute(inner, L10N_ID_ATTR, "inner").unwrap();
        let plain = doc.create_element("p");
        doc.append_child(section, inner).unwrap();
        doc.append_child(section, plain).unwrap();

        doc.append_child(body, section).unwrap();
        let text = doc.create_text("not an element");
        doc.append_child(body, text).unwrap();

        let records = observer.take_records(&mut doc);
        expect_that!(collect_targets(&doc, &records), elements_are![eq(&section), eq(&inner)]);
    }

    #[googletest::test]
    fn pause_is_reentrant_and_resume_uses_current_roots() {
        let (mut doc, mut observer) = setup("<body><main></main><aside></aside></body>");
        let main = doc.elements_by_tag(Document::ROOT, "main")[0];
        let aside = doc.elements_by_tag(Document::ROOT, "aside")[0];
        observer.disconnect_root(&mut doc, Document::ROOT);
        observer.observe_root(&mut doc, main);

        observer.pause(&mut doc);
        observer.pause(&mut doc);
        observer.disconnect_root(&mut doc, main);
        observer.observe_root(&mut doc, aside);
        observer.resume(&mut doc);
        expect_that!(observer.is_paused(), eq(true));
        doc.set_attribute(aside, L10N_ID_ATTR, "while-paused").unwrap();
        observer.resume(&mut doc);

        doc.set_attribute(main, L10N_ID_ATTR, "main").unwrap();
        doc.set_attribute(aside, L10N_ID_ATTR, "aside").unwrap();

        let records = observer.take_records(&mut doc);
        expect_that!(observer.is_paused(), eq(false));
        expect_that!(observer.roots(), elements_are![eq(&aside)]);
        expect_that!(records.len(), eq(1));
        expect_that!(records[0].target, eq(aside));
    }
}
