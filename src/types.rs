//! Core types used throughout the project.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use unic_langid::LanguageIdentifier;

/// Attribute carrying the message id of a translatable element.
pub const L10N_ID_ATTR: &str = "data-l10n-id";

/// Attribute carrying the JSON-encoded arguments of a translatable element.
pub const L10N_ARGS_ATTR: &str = "data-l10n-args";

/// Primary subtags written right-to-left.
const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa", "ps", "ur"];

/// Arguments passed to a message (`data-l10n-args`).
pub type L10nArgs = serde_json::Map<String, Value>;

/// Revision of a language's resources as declared by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Revision {
    Known(u32),
    #[default]
    Unknown,
}

impl Revision {
    /// Parses the part after `:` in a `tag:revision` pair.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|r| r.trim().parse().ok()).map_or(Self::Unknown, Self::Known)
    }
}

/// A language identifier with the revision of its resources.
///
/// Equality of tags during negotiation is exact string equality on `code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag {
    pub code: String,
    pub revision: Revision,
}

impl LanguageTag {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into(), revision: Revision::Unknown }
    }

    #[must_use]
    pub const fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    /// Parses a `tag:revision` pair; a missing or non-numeric revision is
    /// [`Revision::Unknown`].
    #[must_use]
    pub fn parse_with_revision(raw: &str) -> Self {
        let mut parts = raw.trim().splitn(2, ':');
        let code = parts.next().unwrap_or_default().trim();
        Self::new(code).with_revision(Revision::parse(parts.next()))
    }

    /// Writing direction of the language, based on its primary subtag.
    #[must_use]
    pub fn direction(&self) -> Direction {
        let primary = self.code.split('-').next().unwrap_or_default();
        if RTL_LANGUAGES.contains(&primary) { Direction::Rtl } else { Direction::Ltr }
    }

    /// Language identifier for the formatting engine.
    ///
    /// Tags that do not parse fall back to the undetermined language.
    #[must_use]
    pub fn langid(&self) -> LanguageIdentifier {
        self.code.parse().unwrap_or_else(|err| {
            tracing::warn!(code = %self.code, %err, "Invalid language tag, using 'und'");
            LanguageIdentifier::default()
        })
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl From<&str> for LanguageTag {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Text direction written to the document's `dir` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// A message id with optional arguments; either a bare id or `[id, args]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L10nKey {
    pub id: String,
    pub args: Option<L10nArgs>,
}

impl L10nKey {
    #[must_use]
    pub fn new(id: impl Into<String>, args: Option<L10nArgs>) -> Self {
        Self { id: id.into(), args }
    }
}

impl From<&str> for L10nKey {
    fn from(id: &str) -> Self {
        Self::new(id, None)
    }
}

impl From<(&str, L10nArgs)> for L10nKey {
    fn from((id, args): (&str, L10nArgs)) -> Self {
        Self::new(id, Some(args))
    }
}

/// The formatted form of one entity: its value and its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    pub value: Option<String>,
    pub attrs: Option<BTreeMap<String, String>>,
}

impl TranslationResult {
    #[must_use]
    pub fn from_value(value: impl Into<String>) -> Self {
        Self { value: Some(value.into()), attrs: None }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.get_or_insert_with(BTreeMap::new).insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::with_revision("en-US:3", "en-US", Revision::Known(3))]
    #[case::missing_revision("fr", "fr", Revision::Unknown)]
    #[case::invalid_revision("de:abc", "de", Revision::Unknown)]
    #[case::surrounding_whitespace("  pl : 12 ", "pl", Revision::Known(12))]
    fn test_parse_with_revision(
        #[case] raw: &str,
        #[case] code: &str,
        #[case] revision: Revision,
    ) {
        let tag = LanguageTag::parse_with_revision(raw);

        assert_eq!(tag.code, code);
        assert_eq!(tag.revision, revision);
    }

    #[rstest]
    #[case("ar", Direction::Rtl)]
    #[case("he-IL", Direction::Rtl)]
    #[case("fa", Direction::Rtl)]
    #[case("en-US", Direction::Ltr)]
    #[case("ur-PK", Direction::Rtl)]
    #[case("arn", Direction::Ltr)]
    fn test_direction(#[case] code: &str, #[case] expected: Direction) {
        assert_that!(LanguageTag::new(code).direction(), eq(expected));
    }

    #[googletest::test]
    fn langid_falls_back_to_und_for_invalid_tags() {
        let tag = LanguageTag::new("not a tag!");

        expect_that!(tag.langid(), eq(&LanguageIdentifier::default()));
    }

    #[googletest::test]
    fn translation_result_collects_attributes() {
        let result = TranslationResult::from_value("Save")
            .with_attr("title", "Save the file")
            .with_attr("aria-label", "Save");

        let attrs = result.attrs.unwrap();
        expect_that!(attrs.len(), eq(2));
        expect_that!(attrs.get("title"), some(eq(&"Save the file".to_string())));
    }
}
