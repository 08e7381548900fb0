//! Error types shared by the localization runtime.

use thiserror::Error;

use crate::dom::DomError;

/// Non-fatal error produced while formatting a message.
///
/// Formatting never fails: these are returned next to a fallback value so the
/// caller can log them and carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The id is absent from the active context; the id itself is displayed.
    #[error("Unknown entity: {id}")]
    UnknownEntity { id: String },
    /// The message only has attributes.
    #[error("Entity has no value: {id}")]
    NoValue { id: String },
    /// The formatting engine could not resolve part of a pattern.
    #[error("Failed to resolve {id}: {message}")]
    Resolver { id: String, message: String },
    /// A resource contained syntax errors; the valid entries were kept.
    #[error("Failed to parse resource: {message}")]
    Parse { message: String },
    /// A message could not be added to the context, e.g. a duplicate id.
    #[error("Failed to add messages: {message}")]
    Resource { message: String },
}

/// Failure of a localization operation.
#[derive(Error, Debug)]
pub enum L10nError {
    /// `data-l10n-args` is not a JSON object. Authoring bugs are surfaced, not
    /// swallowed.
    #[error("Malformed data-l10n-args for '{id}': {source}")]
    MalformedArgs {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Dom(#[from] DomError),

    /// The controller's lifecycle channel was closed before it became
    /// interactive.
    #[error("Localization was dropped before becoming interactive")]
    Closed,
}
