//! The localization controller.
//!
//! A [`Localization`] owns the active bundles of one document and the message
//! contexts built from them, keyed by bundle identity. It translates every
//! observed root and keeps them translated as the document changes.
//!
//! Everything runs on one thread. State lives in `RefCell`s and no borrow is
//! held across an `.await`; the only suspension points are resource fetches
//! and the wait for the first context.

/// Controller lifecycle
mod lifecycle;
/// Key collection and translation application
mod translate;

use std::cell::{
    Cell,
    RefCell,
};
use std::collections::HashMap;

use tokio::sync::watch;

pub use lifecycle::Lifecycle;

use crate::config::L10nSettings;
use crate::context::{
    ContextOptions,
    FluentContext,
    MessageContext,
    entity_from_context,
    keys_from_context,
    value_from_context,
};
use crate::dom::{
    Document,
    DomEvent,
    NodeId,
    SharedDocument,
};
use crate::error::{
    FormatError,
    L10nError,
};
use crate::fetch::{
    ResourceFetcher,
    fetch_bundle,
};
use crate::observer::{
    RetranslationObserver,
    collect_targets,
    get_translatables,
};
use crate::resolver::{
    BundleId,
    DocumentMeta,
    ResourceBundle,
    same_languages,
};
use crate::types::{
    L10N_ARGS_ATTR,
    L10N_ID_ATTR,
    L10nArgs,
    L10nKey,
    LanguageTag,
    TranslationResult,
};

/// Name of the event dispatched on the document after a retranslation.
pub const RETRANSLATED_EVENT: &str = "DOMRetranslated";

/// Outcome of [`Localization::request_languages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageChange {
    /// Negotiation produced the active languages again; nothing was done.
    Unchanged,
    /// New bundles were activated and the document retranslated.
    Changed(Vec<LanguageTag>),
    /// A later request started before this one finished; its result was
    /// discarded.
    Superseded,
}

/// Signals from the environment a controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentSignal {
    /// The user's language preferences changed.
    LanguageChange(Vec<String>),
    /// New messages for the primary language (hot reload).
    LanguageUpdate(String),
}

/// Mutable state of a controller.
#[derive(Debug)]
struct State<C> {
    /// Active bundles, primary first.
    bundles: Vec<ResourceBundle>,
    /// Contexts of built bundles. Each bundle has at most one.
    contexts: HashMap<BundleId, C>,
    next_bundle_id: u32,
}

impl<C> State<C> {
    fn primary(&self) -> Option<&C> {
        self.bundles.first().and_then(|bundle| self.contexts.get(&bundle.id))
    }

    fn primary_mut(&mut self) -> Option<&mut C> {
        let id = self.bundles.first()?.id;
        self.contexts.get_mut(&id)
    }

    fn make_bundles(&mut self, langs: Vec<LanguageTag>, resource_ids: &[String]) -> Vec<ResourceBundle> {
        langs
            .into_iter()
            .map(|lang| {
                let id = BundleId(self.next_bundle_id);
                self.next_bundle_id += 1;
                ResourceBundle::new(id, lang, resource_ids.to_vec())
            })
            .collect()
    }

    /// Activates `bundles`, dropping the contexts of the bundles they replace.
    fn activate(&mut self, bundles: Vec<ResourceBundle>, primary: C) {
        if let Some(first) = bundles.first() {
            self.contexts.clear();
            self.contexts.insert(first.id, primary);
        }
        self.bundles = bundles;
    }
}

/// Localization of one document.
#[derive(Debug)]
pub struct Localization<F, C = FluentContext> {
    doc: SharedDocument,
    fetcher: F,
    default_language: LanguageTag,
    context_options: ContextOptions,
    state: RefCell<State<C>>,
    observer: RefCell<RetranslationObserver>,
    lifecycle: watch::Sender<Lifecycle>,
    /// Bumped by every language request; only the latest may activate.
    generation: Cell<u64>,
}

#[allow(clippy::future_not_send)]
impl<F, C> Localization<F, C>
where
    F: ResourceFetcher,
    C: MessageContext,
{
    /// Creates a controller observing the document element.
    ///
    /// Nothing is fetched until [`Localization::start`].
    pub fn new(doc: SharedDocument, fetcher: F, settings: &L10nSettings) -> Self {
        let observer = {
            let mut document = doc.borrow_mut();
            let root = document.document_element().unwrap_or(Document::ROOT);
            let mut observer = RetranslationObserver::new(&mut document);
            observer.observe_root(&mut document, root);
            observer
        };

        Self {
            doc,
            fetcher,
            default_language: settings.default_language_tag(),
            context_options: settings.context_options(),
            state: RefCell::new(State { bundles: Vec::new(), contexts: HashMap::new(), next_bundle_id: 0 }),
            observer: RefCell::new(observer),
            lifecycle: watch::Sender::new(Lifecycle::Uninitialized),
            generation: Cell::new(0),
        }
    }

    #[must_use]
    pub const fn document(&self) -> &SharedDocument {
        &self.doc
    }

    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.borrow()
    }

    /// Receiver notified on every lifecycle transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Lifecycle> {
        self.lifecycle.subscribe()
    }

    /// The active languages, primary first.
    #[must_use]
    pub fn languages(&self) -> Vec<LanguageTag> {
        self.state.borrow().bundles.iter().map(|bundle| bundle.lang.clone()).collect()
    }

    /// Resolves the bundles for `requested`, builds the primary context and
    /// translates the document.
    ///
    /// The controller is interactive once the context exists and ready once
    /// the document is translated. A call overtaken by a later one only
    /// waits for the controller to become interactive.
    pub async fn start(&self, requested: &[String]) -> Result<(), L10nError> {
        let generation = self.next_generation();
        let bundles = self.resolve_bundles(requested);
        let context = self.build_context(&bundles).await;
        if generation != self.generation.get() {
            tracing::debug!("Initial languages superseded");
            return self.wait_interactive().await;
        }
        if let Some(context) = context {
            self.state.borrow_mut().activate(bundles, context);
        }

        self.lifecycle.send_if_modified(|state| {
            let advance = *state < Lifecycle::Interactive;
            if advance {
                *state = Lifecycle::Interactive;
            }
            advance
        });
        self.translate_document().await
    }

    /// Renegotiates the languages.
    ///
    /// When negotiation yields the active languages, nothing is fetched and
    /// the document is not touched. Otherwise the new primary bundle is built
    /// and, unless a later request overtook this one, activated and the
    /// document retranslated.
    pub async fn request_languages(&self, requested: &[String]) -> Result<LanguageChange, L10nError> {
        self.wait_interactive().await?;
        let generation = self.next_generation();
        let bundles = self.resolve_bundles(requested);
        if same_languages(&self.state.borrow().bundles, &bundles) {
            tracing::debug!("Languages unchanged");
            return Ok(LanguageChange::Unchanged);
        }

        let context = self.build_context(&bundles).await;
        if generation != self.generation.get() {
            tracing::debug!(generation, "Language request superseded");
            return Ok(LanguageChange::Superseded);
        }
        let Some(context) = context else {
            return Ok(LanguageChange::Unchanged);
        };

        let langs = bundles.iter().map(|bundle| bundle.lang.clone()).collect();
        self.state.borrow_mut().activate(bundles, context);
        tracing::debug!(?langs, "Languages changed");

        self.translate_document().await?;
        Ok(LanguageChange::Changed(langs))
    }

    /// Overrides messages of the primary context and retranslates the
    /// document.
    pub async fn update_messages(&self, source: &str) -> Result<Vec<FormatError>, L10nError> {
        self.wait_interactive().await?;

        let errors = self
            .state
            .borrow_mut()
            .primary_mut()
            .map(|ctx| ctx.add_messages(source, true))
            .unwrap_or_default();
        for err in &errors {
            tracing::warn!(%err, "Error in updated messages");
        }

        self.translate_document().await?;
        Ok(errors)
    }

    pub async fn handle_event(&self, signal: EnvironmentSignal) -> Result<(), L10nError> {
        match signal {
            EnvironmentSignal::LanguageChange(preferences) => {
                self.request_languages(&preferences).await.map(|_| ())
            }
            EnvironmentSignal::LanguageUpdate(source) => self.update_messages(&source).await.map(|_| ()),
        }
    }

    /// Formats the value and attributes of every key, in order.
    pub async fn format_entities(&self, keys: &[L10nKey]) -> Result<Vec<TranslationResult>, L10nError> {
        self.wait_interactive().await?;
        Ok(self.with_primary(|ctx| keys_from_context(ctx, keys, entity_from_context)))
    }

    /// Formats the value of every key, in order. Unknown ids yield the id.
    pub async fn format_values(&self, keys: &[L10nKey]) -> Result<Vec<String>, L10nError> {
        self.wait_interactive().await?;
        Ok(self.with_primary(|ctx| keys_from_context(ctx, keys, value_from_context)))
    }

    pub async fn format_value(&self, id: &str, args: Option<L10nArgs>) -> Result<String, L10nError> {
        let key = L10nKey::new(id, args);
        let values = self.format_values(std::slice::from_ref(&key)).await?;
        Ok(values.into_iter().next().unwrap_or(key.id))
    }

    /// Formats a value without waiting. `None` until the controller is
    /// interactive.
    #[must_use]
    pub fn get_value(&self, id: &str, args: Option<L10nArgs>) -> Option<String> {
        if self.lifecycle() < Lifecycle::Interactive {
            return None;
        }
        let key = L10nKey::new(id, args);
        self.with_primary(|ctx| keys_from_context(ctx, std::slice::from_ref(&key), value_from_context))
            .into_iter()
            .next()
    }

    /// Writes the localization attributes of `element`.
    pub fn set_attributes(&self, element: NodeId, id: &str, args: Option<&L10nArgs>) -> Result<(), L10nError> {
        let mut doc = self.doc.borrow_mut();
        doc.set_attribute(element, L10N_ID_ATTR, id)?;
        if let Some(args) = args {
            let json = serde_json::to_string(args)
                .map_err(|source| L10nError::MalformedArgs { id: id.to_string(), source })?;
            doc.set_attribute(element, L10N_ARGS_ATTR, &json)?;
        }
        Ok(())
    }

    /// Reads the localization attributes of `element`; `None` when it has no
    /// id.
    pub fn get_attributes(&self, element: NodeId) -> Result<Option<L10nKey>, L10nError> {
        let doc = self.doc.borrow();
        let Some(id) = doc.get_attribute(element, L10N_ID_ATTR) else {
            return Ok(None);
        };
        let args = doc
            .get_attribute(element, L10N_ARGS_ATTR)
            .map(|raw| translate::parse_args(id, raw))
            .transpose()?;
        Ok(Some(L10nKey::new(id, args)))
    }

    /// Translates every translatable element of `root`, `root` included.
    pub async fn translate_fragment(&self, root: NodeId) -> Result<(), L10nError> {
        let elements = get_translatables(&self.doc.borrow(), root);
        self.translate_elements(&elements).await
    }

    /// Translates the elements changed or added since the last call.
    ///
    /// Returns how many elements were translated. Changes that touch no
    /// translatable element cause no formatting at all.
    pub async fn process_mutations(&self) -> Result<usize, L10nError> {
        let targets = {
            let mut doc = self.doc.borrow_mut();
            let records = self.observer.borrow().take_records(&mut doc);
            collect_targets(&doc, &records)
        };
        if targets.is_empty() {
            return Ok(0);
        }

        tracing::debug!(count = targets.len(), "Retranslating mutated elements");
        self.translate_elements(&targets).await?;
        Ok(targets.len())
    }

    pub fn observe_root(&self, root: NodeId) {
        self.observer.borrow_mut().observe_root(&mut self.doc.borrow_mut(), root);
    }

    pub fn disconnect_root(&self, root: NodeId) {
        self.observer.borrow_mut().disconnect_root(&mut self.doc.borrow_mut(), root);
    }

    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.observer.borrow().roots().to_vec()
    }

    /// Translates every root, then marks the document element with the active
    /// languages. The first pass makes the controller ready; later passes
    /// dispatch [`RETRANSLATED_EVENT`] on the document.
    async fn translate_document(&self) -> Result<(), L10nError> {
        for root in self.roots() {
            self.translate_fragment(root).await?;
        }

        let langs = self.languages();
        {
            let mut doc = self.doc.borrow_mut();
            if let (Some(html), Some(primary)) = (doc.document_element(), langs.first()) {
                let joined = langs.iter().map(|lang| lang.code.as_str()).collect::<Vec<_>>().join(" ");
                doc.set_attribute(html, "langs", &joined)?;
                doc.set_attribute(html, "lang", &primary.code)?;
                doc.set_attribute(html, "dir", primary.direction().as_str())?;
            }

            if self.lifecycle() == Lifecycle::Ready {
                doc.dispatch_event(
                    Document::ROOT,
                    DomEvent { name: RETRANSLATED_EVENT.to_string(), bubbles: false, cancelable: false },
                );
            }
        }

        self.lifecycle.send_if_modified(|state| {
            let advance = *state < Lifecycle::Ready;
            if advance {
                *state = Lifecycle::Ready;
            }
            advance
        });
        Ok(())
    }

    async fn translate_elements(&self, elements: &[NodeId]) -> Result<(), L10nError> {
        let (targets, keys) = translate::collect_keys(&self.doc.borrow(), elements)?;
        if keys.is_empty() {
            return Ok(());
        }

        let translations = self.format_entities(&keys).await?;
        translate::apply_translations(
            &mut self.doc.borrow_mut(),
            &mut self.observer.borrow_mut(),
            &targets,
            &translations,
        );
        Ok(())
    }

    async fn wait_interactive(&self) -> Result<(), L10nError> {
        let mut receiver = self.lifecycle.subscribe();
        receiver
            .wait_for(|state| *state >= Lifecycle::Interactive)
            .await
            .map(|_| ())
            .map_err(|_| L10nError::Closed)
    }

    fn next_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    /// Negotiates `requested` against the document's declarations and
    /// creates a bundle per resulting language.
    fn resolve_bundles(&self, requested: &[String]) -> Vec<ResourceBundle> {
        let meta = DocumentMeta::from_document(&self.doc.borrow());
        let langs = meta.negotiate(&self.default_language, requested);
        tracing::debug!(?langs, "Negotiated languages");
        self.state.borrow_mut().make_bundles(langs, &meta.resource_ids)
    }

    /// Fetches the primary bundle and builds its context.
    async fn build_context(&self, bundles: &[ResourceBundle]) -> Option<C> {
        let bundle = bundles.first()?;
        let resources = fetch_bundle(&self.fetcher, bundle).await;

        let mut context = C::create(&bundle.lang, &self.context_options);
        for resource in &resources {
            for err in context.add_messages(resource, false) {
                tracing::warn!(lang = %bundle.lang, %err, "Error in resource");
            }
        }
        tracing::debug!(lang = %bundle.lang, resources = resources.len(), "Built context");
        Some(context)
    }

    /// Runs `f` against the primary context, or against an empty context
    /// when none is active so every key falls back to its id.
    fn with_primary<T>(&self, f: impl FnOnce(&C) -> T) -> T {
        let state = self.state.borrow();
        if let Some(ctx) = state.primary() {
            return f(ctx);
        }
        tracing::warn!("No active context, formatting against an empty one");
        f(&C::create(&self.default_language, &self.context_options))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::fetch::InMemoryFetcher;
    use crate::test_utils::{
        element_by_l10n_id,
        plain_settings,
        shared_document,
    };

    const PAGE: &str = r#"<html><head>
<link rel="localization" href="app.ftl">
<meta name="availableLanguages" content="en-US, fr, ar">
<meta name="defaultLanguage" content="en-US">
</head><body>
<h1 data-l10n-id="title">Title</h1>
<p data-l10n-id="greet" data-l10n-args='{"name":"Ana"}'></p>
</body></html>"#;

    fn fetcher() -> InMemoryFetcher {
        InMemoryFetcher::new()
            .with_resource("en-US", "app.ftl", "title = Hello\ngreet = Hello, { $name }!\n")
            .with_resource("fr", "app.ftl", "title = Bonjour\ngreet = Bonjour, { $name } !\n")
            .with_resource("ar", "app.ftl", "title = مرحبا\n")
    }

    fn localization(html: &str) -> Localization<InMemoryFetcher> {
        Localization::new(shared_document(html), fetcher(), &plain_settings())
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(ToString::to_string).collect()
    }

    fn text_of(l10n: &Localization<InMemoryFetcher>, id: &str) -> String {
        let element = element_by_l10n_id(l10n.document(), id);
        l10n.document().borrow().text_content(element)
    }

    fn html_attr(l10n: &Localization<InMemoryFetcher>, name: &str) -> Option<String> {
        let doc = l10n.document().borrow();
        doc.document_element().and_then(|html| doc.get_attribute(html, name)).map(ToString::to_string)
    }

    #[googletest::test]
    #[tokio::test]
    async fn start_translates_and_becomes_ready() {
        let l10n = localization(PAGE);
        expect_that!(l10n.lifecycle(), eq(Lifecycle::Uninitialized));

        l10n.start(&langs(&["de", "fr"])).await.unwrap();

        expect_that!(l10n.lifecycle(), eq(Lifecycle::Ready));
        expect_that!(text_of(&l10n, "title"), eq("Bonjour"));
        expect_that!(text_of(&l10n, "greet"), eq("Bonjour, Ana !"));
        expect_that!(html_attr(&l10n, "langs"), some(eq("fr en-US")));
        expect_that!(html_attr(&l10n, "lang"), some(eq("fr")));
        expect_that!(html_attr(&l10n, "dir"), some(eq("ltr")));
        expect_that!(l10n.document().borrow_mut().take_events(), is_empty());
    }

    #[googletest::test]
    #[tokio::test]
    async fn formatting_waits_for_the_first_context() {
        let l10n = localization(PAGE);

        let (value, started) = tokio::join!(l10n.format_value("title", None), l10n.start(&[]));

        started.unwrap();
        expect_that!(value.unwrap(), eq("Hello"));
    }

    #[googletest::test]
    #[tokio::test]
    async fn format_entities_keeps_order_and_falls_back_to_ids() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();

        let keys = vec![
            L10nKey::from("missing-key"),
            L10nKey::from(("greet", json!({ "name": "Li" }).as_object().cloned().unwrap())),
            L10nKey::from("title"),
        ];
        let values = l10n.format_values(&keys).await.unwrap();
        let entities = l10n.format_entities(&keys).await.unwrap();

        expect_that!(values, elements_are![eq("missing-key"), eq("Hello, Li!"), eq("Hello")]);
        expect_that!(entities.len(), eq(3));
        expect_that!(entities[0], eq(&TranslationResult::from_value("missing-key")));
    }

    #[googletest::test]
    #[tokio::test]
    async fn get_value_is_none_until_interactive() {
        let l10n = localization(PAGE);
        expect_that!(l10n.get_value("title", None), none());

        l10n.start(&[]).await.unwrap();

        expect_that!(l10n.get_value("title", None), some(eq("Hello")));
        expect_that!(l10n.get_value("nope", None), some(eq("nope")));
    }

    #[googletest::test]
    #[tokio::test]
    async fn same_languages_do_not_refetch_or_write() {
        let l10n = localization(PAGE);
        l10n.start(&langs(&["fr"])).await.unwrap();
        let fetches = l10n.fetcher().fetch_count();
        let before = l10n.document().borrow().to_html();

        let change = l10n.request_languages(&langs(&["fr", "de"])).await.unwrap();

        expect_that!(change, eq(&LanguageChange::Unchanged));
        expect_that!(l10n.fetcher().fetch_count(), eq(fetches));
        expect_that!(l10n.document().borrow().to_html(), eq(&before));
        expect_that!(l10n.document().borrow_mut().take_events(), is_empty());
    }

    #[googletest::test]
    #[tokio::test]
    async fn changing_languages_retranslates_and_notifies() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();

        let change = l10n.request_languages(&langs(&["ar"])).await.unwrap();

        let expected = vec![LanguageTag::new("ar"), LanguageTag::new("en-US")];
        expect_that!(change, eq(&LanguageChange::Changed(expected)));
        expect_that!(text_of(&l10n, "title"), eq("مرحبا"));
        expect_that!(text_of(&l10n, "greet"), eq("greet"));
        expect_that!(html_attr(&l10n, "dir"), some(eq("rtl")));
        let events = l10n.document().borrow_mut().take_events();
        expect_that!(events.len(), eq(1));
        expect_that!(events[0].target, eq(Document::ROOT));
        expect_that!(events[0].event.name, eq(RETRANSLATED_EVENT));
        expect_that!(events[0].event.bubbles, eq(false));
        expect_that!(events[0].event.cancelable, eq(false));
    }

    #[googletest::test]
    #[tokio::test]
    async fn switching_back_and_forth_does_not_grow_the_document() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();
        l10n.request_languages(&langs(&["fr"])).await.unwrap();
        let allocated = l10n.document().borrow().node_count();

        l10n.request_languages(&langs(&["en-US"])).await.unwrap();
        l10n.request_languages(&langs(&["fr"])).await.unwrap();

        expect_that!(l10n.document().borrow().node_count(), eq(allocated));
        expect_that!(text_of(&l10n, "greet"), eq("Bonjour, Ana !"));
    }

    #[googletest::test]
    #[tokio::test]
    async fn overtaken_start_leaves_lifecycle_to_the_latest() {
        let l10n = localization(PAGE);
        let (french, arabic) = (langs(&["fr"]), langs(&["ar"]));

        let (first, second) = tokio::join!(l10n.start(&french), l10n.start(&arabic));

        first.unwrap();
        second.unwrap();
        expect_that!(l10n.lifecycle(), eq(Lifecycle::Ready));
        expect_that!(l10n.languages()[0].code, eq("ar"));
        expect_that!(text_of(&l10n, "title"), eq("مرحبا"));
        expect_that!(l10n.document().borrow_mut().take_events(), is_empty());
    }

    #[googletest::test]
    #[tokio::test]
    async fn latest_language_request_wins() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();

        let (french, arabic) = (langs(&["fr"]), langs(&["ar"]));
        let (first, second) =
            tokio::join!(l10n.request_languages(&french), l10n.request_languages(&arabic));

        expect_that!(first.unwrap(), eq(&LanguageChange::Superseded));
        expect_that!(
            second.unwrap(),
            eq(&LanguageChange::Changed(vec![LanguageTag::new("ar"), LanguageTag::new("en-US")]))
        );
        expect_that!(l10n.languages()[0].code, eq("ar"));
        expect_that!(text_of(&l10n, "title"), eq("مرحبا"));
    }

    #[googletest::test]
    #[tokio::test]
    async fn mutations_translate_new_and_rekeyed_elements() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();
        let body = l10n.document().borrow().elements_by_tag(Document::ROOT, "body")[0];

        let added = {
            let mut doc = l10n.document().borrow_mut();
            let span = doc.create_element("span");
            doc.append_child(body, span).unwrap();
            span
        };
        l10n.set_attributes(added, "greet", json!({ "name": "Ana" }).as_object()).unwrap();
        let translated = l10n.process_mutations().await.unwrap();

        expect_that!(translated, eq(1));
        expect_that!(l10n.document().borrow().text_content(added), eq("Hello, Ana!"));
        expect_that!(l10n.process_mutations().await.unwrap(), eq(0));
    }

    #[googletest::test]
    #[tokio::test]
    async fn unrelated_mutations_do_nothing() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();
        let title = element_by_l10n_id(l10n.document(), "title");

        l10n.document().borrow_mut().set_attribute(title, "class", "big").unwrap();

        expect_that!(l10n.process_mutations().await.unwrap(), eq(0));
    }

    #[googletest::test]
    #[tokio::test]
    async fn reapplying_the_same_key_is_idempotent() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();
        let greet = element_by_l10n_id(l10n.document(), "greet");
        let first = l10n.document().borrow().inner_html(greet);

        l10n.document().borrow_mut().remove_attribute(greet, L10N_ID_ATTR).unwrap();
        l10n.set_attributes(greet, "greet", None).unwrap();
        l10n.process_mutations().await.unwrap();

        expect_that!(l10n.document().borrow().inner_html(greet), eq(&first));
    }

    #[googletest::test]
    #[tokio::test]
    async fn update_messages_overrides_primary_context() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();

        l10n.handle_event(EnvironmentSignal::LanguageUpdate("title = Hi there\n".into()))
            .await
            .unwrap();

        expect_that!(text_of(&l10n, "title"), eq("Hi there"));
        expect_that!(text_of(&l10n, "greet"), eq("Hello, Ana!"));
        expect_that!(l10n.document().borrow_mut().take_events().len(), eq(1));
    }

    #[googletest::test]
    #[tokio::test]
    async fn language_change_signal_requests_languages() {
        let l10n = localization(PAGE);
        l10n.start(&[]).await.unwrap();

        l10n.handle_event(EnvironmentSignal::LanguageChange(langs(&["fr"]))).await.unwrap();

        expect_that!(text_of(&l10n, "title"), eq("Bonjour"));
    }

    #[googletest::test]
    #[tokio::test]
    async fn attributes_round_trip() {
        let l10n = localization(PAGE);
        let greet = element_by_l10n_id(l10n.document(), "greet");

        let key = l10n.get_attributes(greet).unwrap().unwrap();
        l10n.set_attributes(greet, "other", None).unwrap();

        expect_that!(key.id, eq("greet"));
        expect_that!(key.args.unwrap().get("name"), some(eq(&json!("Ana"))));
        expect_that!(l10n.get_attributes(greet).unwrap().unwrap().id, eq("other"));
    }

    #[googletest::test]
    #[tokio::test]
    async fn malformed_args_surface_from_get_attributes() {
        let l10n = localization(r#"<p data-l10n-id="x" data-l10n-args="{nope}"></p>"#);
        let p = element_by_l10n_id(l10n.document(), "x");

        let result = l10n.get_attributes(p);

        assert!(matches!(result, Err(L10nError::MalformedArgs { .. })));
    }

    #[googletest::test]
    #[tokio::test]
    async fn disconnected_root_is_not_retranslated() {
        let l10n = localization(PAGE);
        let body = l10n.document().borrow().elements_by_tag(Document::ROOT, "body")[0];
        let html = l10n.document().borrow().document_element().unwrap();
        l10n.disconnect_root(html);
        l10n.observe_root(body);
        l10n.start(&[]).await.unwrap();
        expect_that!(l10n.roots(), elements_are![eq(&body)]);

        l10n.disconnect_root(body);
        let aside = {
            let mut doc = l10n.document().borrow_mut();
            let aside = doc.create_element("aside");
            doc.append_child(body, aside).unwrap();
            aside
        };
        l10n.set_attributes(aside, "title", None).unwrap();

        expect_that!(l10n.roots(), is_empty());
        expect_that!(l10n.process_mutations().await.unwrap(), eq(0));
        expect_that!(l10n.document().borrow().text_content(aside), eq(""));
    }
}
