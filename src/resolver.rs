//! Language negotiation and resource bundles.
//!
//! A document declares its resources and languages in `<head>`; the resolver
//! turns those declarations plus the user's preferences into an ordered list
//! of [`ResourceBundle`]s, one per negotiated language.

/// Resource bundles and their identity
mod bundle;
/// Document-level declarations
mod meta;
/// Language negotiation
mod negotiate;

pub use bundle::{
    BundleId,
    ResourceBundle,
    same_languages,
};
pub use meta::DocumentMeta;
pub use negotiate::negotiate_languages;
