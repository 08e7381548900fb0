//! dom-l10n
//!
//! Localization runtime for HTML documents: negotiates languages, builds
//! Fluent contexts from resource bundles and overlays translations onto live
//! elements without breaking references to existing nodes.

pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod localization;
pub mod observer;
pub mod overlay;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use error::{
    FormatError,
    L10nError,
};
pub use localization::{
    EnvironmentSignal,
    LanguageChange,
    Lifecycle,
    Localization,
};
