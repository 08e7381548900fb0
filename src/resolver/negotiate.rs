use std::collections::BTreeMap;

use crate::types::{
    LanguageTag,
    Revision,
};

/// Picks the active languages for a document.
///
/// The first requested tag that is available wins. The result is
/// `[supported, default]`, or just `[default]` when nothing matched or the
/// match is the default itself. Tags are compared by exact string equality.
#[must_use]
pub fn negotiate_languages(
    default: &LanguageTag,
    available: &BTreeMap<String, Revision>,
    requested: &[String],
) -> Vec<LanguageTag> {
    let supported = requested.iter().find_map(|code| {
        available
            .get(code)
            .map(|revision| LanguageTag::new(code.as_str()).with_revision(*revision))
    });

    match supported {
        Some(tag) if tag.code != default.code => vec![tag, default.clone()],
        _ => vec![default.clone()],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn available(codes: &[&str]) -> BTreeMap<String, Revision> {
        codes.iter().map(|code| ((*code).to_string(), Revision::Unknown)).collect()
    }

    fn requested(codes: &[&str]) -> Vec<String> {
        codes.iter().map(ToString::to_string).collect()
    }

    fn codes(tags: &[LanguageTag]) -> Vec<&str> {
        tags.iter().map(|tag| tag.code.as_str()).collect()
    }

    #[rstest]
    #[case::first_available_wins(&["pl", "fr", "de"], &["de", "fr"], vec!["fr", "en-US"])]
    #[case::nothing_requested(&[], &["de", "fr"], vec!["en-US"])]
    #[case::nothing_available(&["pl"], &["de"], vec!["en-US"])]
    #[case::default_requested(&["en-US", "de"], &["en-US", "de"], vec!["en-US"])]
    #[case::no_partial_matching(&["de-AT"], &["de"], vec!["en-US"])]
    fn test_negotiate_languages(
        #[case] wanted: &[&str],
        #[case] offered: &[&str],
        #[case] expected: Vec<&str>,
    ) {
        let result =
            negotiate_languages(&LanguageTag::new("en-US"), &available(offered), &requested(wanted));

        assert_eq!(codes(&result), expected);
    }

    #[googletest::test]
    fn carries_revisions_of_available_languages() {
        let mut offered = available(&["fr"]);
        offered.insert("fr".to_string(), Revision::Known(7));
        let default = LanguageTag::new("en-US").with_revision(Revision::Known(2));

        let result = negotiate_languages(&default, &offered, &requested(&["fr"]));

        expect_that!(result.len(), eq(2));
        expect_that!(result[0].revision, eq(Revision::Known(7)));
        expect_that!(result[1], eq(&default));
    }

    #[googletest::test]
    fn never_returns_more_than_two_languages() {
        let offered = available(&["a", "b", "c", "d"]);

        let result = negotiate_languages(
            &LanguageTag::new("z"),
            &offered,
            &requested(&["a", "b", "c", "d"]),
        );

        expect_that!(result.len(), le(2));
        expect_that!(result[0].code, eq("a"));
    }
}
