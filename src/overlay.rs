//! Overlaying translations onto live elements.
//!
//! Translated markup is untrusted: only a fixed set of text-level elements and
//! attributes can reach the document. Elements already present in the target
//! are matched by tag and position and updated in place, so references held
//! by other code stay valid across retranslation.

/// Allow-lists for elements and attributes
mod allowed;
/// The merge algorithm
mod merge;

pub use allowed::{
    is_attr_allowed,
    is_element_allowed,
};
pub use merge::{
    OverlayReport,
    overlay_element,
};
