//! Resource fetching.
//!
//! The runtime never talks to a transport directly: it asks a
//! [`ResourceFetcher`] for the text of one resource in one language. A failed
//! resource is dropped from its bundle, never fatal.

use std::cell::Cell;
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;

use crate::resolver::ResourceBundle;
use crate::types::LanguageTag;

/// Placeholder in resource ids replaced by the language code.
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Resource '{res_id}' not found for {lang}")]
    NotFound { lang: String, res_id: String },

    #[error("Timed out after {timeout:?} fetching '{res_id}' for {lang}")]
    Timeout { lang: String, res_id: String, timeout: Duration },

    #[error("Failed to read '{res_id}': {source}")]
    Io {
        res_id: String,
        #[source]
        source: io::Error,
    },
}

/// Source of raw resource text.
pub trait ResourceFetcher {
    /// Fetches `res_id` for `lang`.
    fn fetch(
        &self,
        lang: &LanguageTag,
        res_id: &str,
    ) -> impl Future<Output = Result<String, FetchError>>;
}

/// Resolves the path of a resource id for a language.
#[must_use]
pub fn localize_resource_id(res_id: &str, lang: &LanguageTag) -> String {
    res_id.replace(LOCALE_PLACEHOLDER, &lang.code)
}

/// Fetches every resource of `bundle`, in declaration order.
///
/// Failed resources are logged and left out.
pub async fn fetch_bundle<F: ResourceFetcher>(fetcher: &F, bundle: &ResourceBundle) -> Vec<String> {
    let results =
        join_all(bundle.resource_ids.iter().map(|res_id| fetcher.fetch(&bundle.lang, res_id))).await;

    results
        .into_iter()
        .filter_map(|result| {
            result
                .map_err(|err| tracing::warn!(lang = %bundle.lang, %err, "Dropping resource"))
                .ok()
        })
        .collect()
}

/// Reads resources from a directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
    timeout: Duration,
}

impl FsFetcher {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { root: root.into(), timeout }
    }
}

impl ResourceFetcher for FsFetcher {
    async fn fetch(&self, lang: &LanguageTag, res_id: &str) -> Result<String, FetchError> {
        let path = self.root.join(localize_resource_id(res_id, lang));
        tracing::debug!(?path, %lang, "Fetching resource");

        match tokio::time::timeout(self.timeout, tokio::fs::read_to_string(&path)).await {
            Err(_) => Err(FetchError::Timeout {
                lang: lang.code.clone(),
                res_id: res_id.to_string(),
                timeout: self.timeout,
            }),
            Ok(Err(err)) if err.kind() == io::ErrorKind::NotFound => {
                Err(FetchError::NotFound { lang: lang.code.clone(), res_id: res_id.to_string() })
            }
            Ok(Err(source)) => Err(FetchError::Io { res_id: res_id.to_string(), source }),
            Ok(Ok(text)) => Ok(text),
        }
    }
}

/// Serves resources from memory and counts fetches.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    resources: HashMap<(String, String), String>,
    fetch_count: Cell<usize>,
}

impl InMemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource, builder style.
    #[must_use]
    pub fn with_resource(mut self, lang: &str, res_id: &str, text: &str) -> Self {
        self.insert(lang, res_id, text);
        self
    }

    pub fn insert(&mut self, lang: &str, res_id: &str, text: &str) {
        self.resources.insert((lang.to_string(), res_id.to_string()), text.to_string());
    }

    /// Number of `fetch` calls so far, failed ones included.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.get()
    }
}

impl ResourceFetcher for InMemoryFetcher {
    async fn fetch(&self, lang: &LanguageTag, res_id: &str) -> Result<String, FetchError> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        tokio::task::yield_now().await;

        self.resources
            .get(&(lang.code.clone(), res_id.to_string()))
            .cloned()
            .ok_or_else(|| FetchError::NotFound { lang: lang.code.clone(), res_id: res_id.to_string() })
    }
}
