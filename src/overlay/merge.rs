use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{
    is_attr_allowed,
    is_element_allowed,
};
use crate::dom::{
    Document,
    DomError,
    FragmentElement,
    FragmentNode,
    NodeId,
    parse_fragment,
};
use crate::types::TranslationResult;

/// A tag opening or a character reference: the value needs parsing.
#[allow(clippy::unwrap_used)]
static RE_OVERLAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<|&#?\w+;").unwrap());

/// Which elements an overlay kept and which it created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Pre-existing elements updated in place.
    pub reused: Vec<NodeId>,
    /// Allowed elements created from the translation.
    pub created: Vec<NodeId>,
}

/// Applies `translation` to `element`.
///
/// Plain values replace the text content. Values with markup are parsed into
/// an inert fragment and merged. Attributes of the translation are set when
/// allowed; attributes it does not mention are left as they are.
pub fn overlay_element(
    doc: &mut Document,
    element: NodeId,
    translation: &TranslationResult,
) -> Result<OverlayReport, DomError> {
    let mut report = OverlayReport::default();

    if let Some(value) = &translation.value {
        if RE_OVERLAY.is_match(value) {
            let fragment = parse_fragment(value)?;
            merge_children(doc, element, fragment, &mut report)?;
        } else {
            doc.set_text_content(element, value)?;
        }
    }

    if let Some(attrs) = &translation.attrs {
        for (name, value) in attrs {
            if attr_allowed_on(doc, element, name) {
                doc.set_attribute(element, name, value)?;
            }
        }
    }

    Ok(report)
}

/// Rebuilds the children of `target` from `translation`, reusing the existing
/// element at the same tag and ordinal wherever there is one.
fn merge_children(
    doc: &mut Document,
    target: NodeId,
    translation: Vec<FragmentNode>,
    report: &mut OverlayReport,
) -> Result<(), DomError> {
    let mut buffer = Vec::with_capacity(translation.len());
    let mut ordinals: HashMap<String, usize> = HashMap::new();

    for child in translation {
        let element = match child {
            FragmentNode::Text(text) => {
                buffer.push(doc.create_text(text));
                continue;
            }
            FragmentNode::Element(element) => element,
        };

        let ordinal = ordinals.entry(element.tag.clone()).or_default();
        let index = *ordinal;
        *ordinal += 1;

        if let Some(existing) = nth_element_of_type(doc, target, &element.tag, index) {
            merge_element(doc, existing, element, report)?;
            report.reused.push(existing);
            buffer.push(existing);
        } else if is_element_allowed(&element.tag) {
            let created = doc.create_element(&element.tag);
            merge_element(doc, created, element, report)?;
            report.created.push(created);
            buffer.push(created);
        } else {
            let text = FragmentNode::Element(element).text_content();
            buffer.push(doc.create_text(text));
        }
    }

    doc.replace_children(target, buffer)
}

fn merge_element(
    doc: &mut Document,
    target: NodeId,
    translation: FragmentElement,
    report: &mut OverlayReport,
) -> Result<(), DomError> {
    merge_children(doc, target, translation.children, report)?;

    // TODO: clear attributes set by a previous language that this one omits.
    for (name, value) in &translation.attrs {
        if attr_allowed_on(doc, target, name) {
            doc.set_attribute(target, name, value)?;
        }
    }
    Ok(())
}

/// The `index`-th element child of `parent` with tag `tag`.
fn nth_element_of_type(doc: &Document, parent: NodeId, tag: &str, index: usize) -> Option<NodeId> {
    doc.element_children(parent).filter(|child| doc.tag_name(*child) == Some(tag)).nth(index)
}

fn attr_allowed_on(doc: &Document, element: NodeId, attr: &str) -> bool {
    let Some(tag) = doc.tag_name(element) else {
        return false;
    };
    is_attr_allowed(attr, tag, doc.get_attribute(element, "type"))
}
