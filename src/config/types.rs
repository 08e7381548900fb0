use std::path::PathBuf;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;
use unic_langid::LanguageIdentifier;

use crate::context::ContextOptions;
use crate::types::LanguageTag;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "requestedLanguages[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct L10nSettings {
    /// Fallback used when a document declares no `defaultLanguage`.
    /// Accepts an optional revision (`en-US:3`).
    pub default_language: String,

    /// Initial preference list, most preferred first.
    pub requested_languages: Vec<String>,

    /// Wrap placeables in Unicode isolation marks.
    pub use_isolating: bool,

    /// Per-resource timeout of the filesystem fetcher.
    pub fetch_timeout_ms: u64,

    /// Directory resource ids are resolved against.
    /// Relative paths are relative to the directory holding the config file.
    pub resource_root: Option<PathBuf>,
}

impl Default for L10nSettings {
    fn default() -> Self {
        Self {
            default_language: "en-US".to_string(),
            requested_languages: Vec::new(),
            use_isolating: true,
            fetch_timeout_ms: 5000,
            resource_root: None,
        }
    }
}

impl L10nSettings {
    #[must_use]
    pub fn default_language_tag(&self) -> LanguageTag {
        LanguageTag::parse_with_revision(&self.default_language)
    }

    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    #[must_use]
    pub const fn context_options(&self) -> ContextOptions {
        ContextOptions { use_isolating: self.use_isolating }
    }

    /// # Errors
    /// - Empty or unparsable language tag
    /// - Zero timeout
    /// - Empty resource root
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(message) = check_language_tag(&self.default_language_tag().code) {
            errors.push(ValidationError::new("defaultLanguage", message));
        }

        for (index, lang) in self.requested_languages.iter().enumerate() {
            if let Err(message) = check_language_tag(lang) {
                errors.push(ValidationError::new(format!("requestedLanguages[{index}]"), message));
            }
        }

        if self.fetch_timeout_ms == 0 {
            errors.push(ValidationError::new(
                "fetchTimeoutMs",
                "The timeout must be greater than zero. Example: 5000",
            ));
        }

        if let Some(root) = &self.resource_root
            && root.as_os_str().is_empty()
        {
            errors.push(ValidationError::new(
                "resourceRoot",
                "The path cannot be empty. Please specify a directory, or remove this field",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn check_language_tag(code: &str) -> Result<(), String> {
    if code.trim().is_empty() {
        return Err("The language cannot be empty. Example: \"en-US\"".to_string());
    }
    code.parse::<LanguageIdentifier>()
        .map(|_| ())
        .map_err(|e| format!("Invalid language tag '{code}': {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::types::Revision;

    #[rstest]
    fn validate_valid_settings() {
        let settings = L10nSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{"requestedLanguages": ["fr", "de"], "useIsolating": false}"#;

        let settings: L10nSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.default_language, eq("en-US"));
        assert_that!(settings.requested_languages, elements_are![eq("fr"), eq("de")]);
        assert_that!(settings.use_isolating, eq(false));
        assert_that!(settings.fetch_timeout_ms, eq(5000));
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let settings: L10nSettings = serde_json::from_str("{}").unwrap();

        assert_that!(settings, eq(&L10nSettings::default()));
    }

    #[rstest]
    fn default_language_tag_keeps_revision() {
        let settings =
            L10nSettings { default_language: "pl:4".to_string(), ..L10nSettings::default() };

        let tag = settings.default_language_tag();

        assert_that!(tag.code, eq("pl"));
        assert_that!(tag.revision, eq(Revision::Known(4)));
        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn validate_invalid_default_language_empty() {
        let settings = L10nSettings { default_language: String::new(), ..L10nSettings::default() };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("defaultLanguage")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    #[rstest]
    fn validate_invalid_requested_language() {
        let settings = L10nSettings {
            requested_languages: vec!["fr".to_string(), "not a language".to_string()],
            ..L10nSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("requestedLanguages[1]")),
                field!(ValidationError.message, contains_substring("Invalid language tag"))
            ]])
        );
    }

    #[rstest]
    fn validate_invalid_timeout_and_root() {
        let settings = L10nSettings {
            fetch_timeout_ms: 0,
            resource_root: Some(PathBuf::new()),
            ..L10nSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![
                field!(ValidationError.field_path, eq("fetchTimeoutMs")),
                field!(ValidationError.field_path, eq("resourceRoot"))
            ])
        );
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = L10nSettings {
            default_language: String::new(),
            fetch_timeout_ms: 0,
            ..L10nSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let error_message = format!("{}", ConfigError::ValidationErrors(errors));

        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. defaultLanguage"));
        assert_that!(error_message, contains_substring("2. fetchTimeoutMs"));
    }
}
