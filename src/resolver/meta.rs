use std::collections::BTreeMap;

use super::negotiate_languages;
use crate::dom::{
    Document,
    NodeId,
};
use crate::types::{
    LanguageTag,
    Revision,
};

/// What a document declares about its localization in `<head>`.
///
/// ```html
/// <link rel="localization" href="locales/{locale}/app.ftl">
/// <meta name="availableLanguages" content="en-US:3, fr:2, de">
/// <meta name="defaultLanguage" content="en-US:3">
/// <meta name="appVersion" content="52.0">
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    /// `href`s of `<link rel="localization">`, in document order.
    pub resource_ids: Vec<String>,
    pub available_languages: BTreeMap<String, Revision>,
    pub default_language: Option<LanguageTag>,
    pub app_version: Option<String>,
}

impl DocumentMeta {
    /// Reads the declarations from the document's `<head>`, or from the whole
    /// document when it has none.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let scope = doc.head().unwrap_or(Document::ROOT);
        let mut meta = Self::default();

        for id in doc.descendants(scope) {
            match doc.tag_name(id) {
                Some("link") => meta.read_link(doc, id),
                Some("meta") => meta.read_meta(doc, id),
                _ => {}
            }
        }

        tracing::debug!(
            resources = meta.resource_ids.len(),
            available = meta.available_languages.len(),
            default = ?meta.default_language,
            "Read localization metadata"
        );
        meta
    }

    fn read_link(&mut self, doc: &Document, id: NodeId) {
        if doc.get_attribute(id, "rel") != Some("localization") {
            return;
        }
        if let Some(href) = doc.get_attribute(id, "href") {
            self.resource_ids.push(href.to_string());
        }
    }

    fn read_meta(&mut self, doc: &Document, id: NodeId) {
        let Some(name) = doc.get_attribute(id, "name") else {
            return;
        };
        let content = doc.get_attribute(id, "content").unwrap_or_default().trim();

        match name {
            "availableLanguages" => {
                for pair in content.split(',').filter(|pair| !pair.trim().is_empty()) {
                    let tag = LanguageTag::parse_with_revision(pair);
                    self.available_languages.insert(tag.code, tag.revision);
                }
            }
            "defaultLanguage" => {
                let tag = LanguageTag::parse_with_revision(content);
                self.available_languages.entry(tag.code.clone()).or_insert(tag.revision);
                self.default_language = Some(tag);
            }
            "appVersion" => self.app_version = Some(content.to_string()),
            _ => {}
        }
    }

    /// Negotiates the active languages, using `fallback` when the document does
    /// not declare a default language.
    #[must_use]
    pub fn negotiate(&self, fallback: &LanguageTag, requested: &[String]) -> Vec<LanguageTag> {
        let default = self.default_language.as_ref().unwrap_or(fallback);
        negotiate_languages(default, &self.available_languages, requested)
    }
}
