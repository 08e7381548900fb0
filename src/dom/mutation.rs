//! Mutation records and observer registrations.

use super::NodeId;

/// Handle to an observer registered with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(super) usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Attributes { name: String, old_value: Option<String> },
    ChildList { added: Vec<NodeId>, removed: Vec<NodeId> },
}

/// One observed change. For child-list changes `target` is the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

impl MutationRecord {
    #[must_use]
    pub fn attribute_name(&self) -> Option<&str> {
        match &self.kind {
            MutationKind::Attributes { name, .. } => Some(name),
            MutationKind::ChildList { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverConfig {
    pub attributes: bool,
    pub child_list: bool,
    pub subtree: bool,
    /// When set, only changes to these attributes are recorded.
    pub attribute_filter: Option<Vec<String>>,
}

impl ObserverConfig {
    pub(super) fn accepts(&self, record: &MutationRecord) -> bool {
        match &record.kind {
            MutationKind::Attributes { name, .. } => {
                self.attributes
                    && self.attribute_filter.as_ref().is_none_or(|filter| filter.contains(name))
            }
            MutationKind::ChildList { .. } => self.child_list,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct ObserverEntry {
    pub(super) registrations: Vec<(NodeId, ObserverConfig)>,
    pub(super) queue: Vec<MutationRecord>,
}
