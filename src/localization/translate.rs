use crate::dom::{
    Document,
    NodeId,
};
use crate::error::L10nError;
use crate::observer::RetranslationObserver;
use crate::overlay::overlay_element;
use crate::types::{
    L10N_ARGS_ATTR,
    L10N_ID_ATTR,
    L10nArgs,
    L10nKey,
    TranslationResult,
};

/// Escapes markup characters so argument values can only ever become text.
fn escape_args(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parses `data-l10n-args` of the element keyed `id`.
pub(super) fn parse_args(id: &str, raw: &str) -> Result<L10nArgs, L10nError> {
    serde_json::from_str(raw).map_err(|source| L10nError::MalformedArgs { id: id.to_string(), source })
}

/// Reads the keys of `elements`. Elements without an id are skipped, so the
/// returned pairs are what gets formatted and applied.
///
/// # Errors
/// [`L10nError::MalformedArgs`] when an element's arguments are not a JSON
/// object.
pub(super) fn collect_keys(
    doc: &Document,
    elements: &[NodeId],
) -> Result<(Vec<NodeId>, Vec<L10nKey>), L10nError> {
    let mut targets = Vec::with_capacity(elements.len());
    let mut keys = Vec::with_capacity(elements.len());

    for element in elements {
        let Some(id) = doc.get_attribute(*element, L10N_ID_ATTR) else {
            tracing::debug!(?element, "Skipping element without an id");
            continue;
        };
        let args = doc
            .get_attribute(*element, L10N_ARGS_ATTR)
            .map(|raw| parse_args(id, &escape_args(raw)))
            .transpose()?;
        targets.push(*element);
        keys.push(L10nKey::new(id, args));
    }
    Ok((targets, keys))
}

/// Overlays each translation onto its element with observation paused.
///
/// A failing element is logged and skipped.
pub(super) fn apply_translations(
    doc: &mut Document,
    observer: &mut RetranslationObserver,
    elements: &[NodeId],
    translations: &[TranslationResult],
) {
    debug_assert_eq!(elements.len(), translations.len());

    observer.pause(doc);
    for (element, translation) in elements.iter().zip(translations) {
        if let Err(err) = overlay_element(doc, *element, translation) {
            tracing::warn!(?element, %err, "Failed to apply translation");
        }
    }
    observer.resume(doc);
}
