use crate::types::LanguageTag;

/// Identity of a [`ResourceBundle`] within one controller.
///
/// Contexts are looked up by bundle identity, not by language, so two
/// bundles for the same language can coexist during a language switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleId(pub u32);

/// The resources of one language.
///
/// Bundles are replaced, never mutated, when the active languages change.
/// The parsed messages live in the controller, keyed by [`BundleId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBundle {
    pub id: BundleId,
    pub lang: LanguageTag,
    pub resource_ids: Vec<String>,
}

impl ResourceBundle {
    #[must_use]
    pub const fn new(id: BundleId, lang: LanguageTag, resource_ids: Vec<String>) -> Self {
        Self { id, lang, resource_ids }
    }
}

/// Whether two bundle lists cover the same languages in the same order.
#[must_use]
pub fn same_languages(old: &[ResourceBundle], new: &[ResourceBundle]) -> bool {
    old.len() == new.len() && old.iter().zip(new).all(|(a, b)| a.lang == b.lang)
}
