//! Arena-backed DOM used as the localization target.
//!
//! Nodes live in a single arena owned by [`Document`] and are addressed by
//! [`NodeId`]. A `NodeId` held by host code is the equivalent of a DOM node
//! reference: it stays valid (and keeps its identity) for the lifetime of the
//! document, attached or not.

/// Document arena and tree operations
mod document;
/// Mutation records and observer registrations
mod mutation;
/// Node and fragment types
mod node;
/// Inert markup parser
mod parser;
/// HTML serializer
mod serialize;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

pub use document::{
    DispatchedEvent,
    Document,
    DomEvent,
};
pub use mutation::{
    MutationKind,
    MutationRecord,
    ObserverConfig,
    ObserverId,
};
pub use node::{
    ElementData,
    FragmentElement,
    FragmentNode,
    NodeData,
    NodeId,
};
pub use parser::{
    decode_entities,
    parse_fragment,
};

/// Document shared between the host and the localization controller.
pub type SharedDocument = Rc<RefCell<Document>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Node {0:?} does not exist")]
    NodeNotFound(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {child:?} cannot be inserted into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Failed to parse markup: {0}")]
    Parse(String),
}
