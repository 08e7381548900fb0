//! Message contexts: the formatting engine bound to one bundle.
//!
//! The controller only talks to the [`MessageContext`] trait. The helpers in
//! this module implement the fallback rules shared by every engine: an
//! unknown id is displayed as itself, and errors are returned, never raised.

/// Fluent-backed context
mod fluent;

pub use fluent::FluentContext;

use crate::error::FormatError;
use crate::types::{
    L10nArgs,
    L10nKey,
    LanguageTag,
    TranslationResult,
};

/// Options applied to every context a controller creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Wrap placeables in Unicode isolation marks.
    pub use_isolating: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self { use_isolating: true }
    }
}

/// Parsed messages of exactly one language.
pub trait MessageContext {
    fn create(lang: &LanguageTag, options: &ContextOptions) -> Self
    where
        Self: Sized;

    fn lang(&self) -> &LanguageTag;

    /// Adds the messages of one resource. With `overriding`, existing messages
    /// are replaced instead of reported as duplicates.
    ///
    /// Invalid entries are skipped and reported; the valid ones are kept.
    fn add_messages(&mut self, source: &str, overriding: bool) -> Vec<FormatError>;

    fn has_message(&self, id: &str) -> bool;

    /// Formats the value of message `id`.
    ///
    /// Returns `None` when the message is unknown and `Some((None, _))` when it
    /// only has attributes.
    fn format_to_primitive(
        &self,
        id: &str,
        args: Option<&L10nArgs>,
    ) -> Option<(Option<String>, Vec<FormatError>)>;

    /// Formats every attribute ("trait") of message `id`, each independently.
    fn format_traits(&self, id: &str, args: Option<&L10nArgs>) -> (Vec<(String, String)>, Vec<FormatError>);
}

/// Formats the value of `key`, falling back to the id itself.
pub fn value_from_context<C: MessageContext + ?Sized>(
    ctx: &C,
    key: &L10nKey,
) -> (String, Vec<FormatError>) {
    match ctx.format_to_primitive(&key.id, key.args.as_ref()) {
        None => (key.id.clone(), vec![FormatError::UnknownEntity { id: key.id.clone() }]),
        Some((None, mut errors)) => {
            errors.push(FormatError::NoValue { id: key.id.clone() });
            (key.id.clone(), errors)
        }
        Some((Some(value), errors)) => (value, errors),
    }
}

/// Formats the value and attributes of `key`.
///
/// An unknown id yields the id as value and no attributes. A broken attribute
/// only degrades that attribute.
pub fn entity_from_context<C: MessageContext + ?Sized>(
    ctx: &C,
    key: &L10nKey,
) -> (TranslationResult, Vec<FormatError>) {
    let Some((value, mut errors)) = ctx.format_to_primitive(&key.id, key.args.as_ref()) else {
        return (
            TranslationResult::from_value(key.id.clone()),
            vec![FormatError::UnknownEntity { id: key.id.clone() }],
        );
    };

    let (traits, trait_errors) = ctx.format_traits(&key.id, key.args.as_ref());
    errors.extend(trait_errors);

    let attrs = (!traits.is_empty()).then(|| traits.into_iter().collect());
    (TranslationResult { value, attrs }, errors)
}

/// Formats every key with `method`, preserving order and cardinality.
///
/// Errors are logged and dropped.
pub fn keys_from_context<C, T, M>(ctx: &C, keys: &[L10nKey], method: M) -> Vec<T>
where
    C: MessageContext + ?Sized,
    M: Fn(&C, &L10nKey) -> (T, Vec<FormatError>),
{
    keys.iter()
        .map(|key| {
            let (result, errors) = method(ctx, key);
            for err in errors {
                tracing::warn!(lang = %ctx.lang(), id = %key.id, %err, "Formatting error");
            }
            result
        })
        .collect()
}
