//! Inert markup parser built on tree-sitter-html.
//!
//! Produces a detached [`FragmentNode`] tree. Nothing is executed or
//! resolved: scripts become text, comments and doctypes are dropped.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{
    Captures,
    Regex,
};
use tree_sitter::{
    Node,
    Parser,
};

use super::DomError;
use super::node::{
    FragmentElement,
    FragmentNode,
    RAW_TEXT_ELEMENTS,
    VOID_ELEMENTS,
};

#[allow(clippy::unwrap_used)]
static RE_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z]{1,30});?").unwrap()
});

/// Parses `markup` into a list of detached nodes.
///
/// # Errors
/// Returns [`DomError::Parse`] when the HTML grammar cannot be loaded or the
/// parser gives up.
pub fn parse_fragment(markup: &str) -> Result<Vec<FragmentNode>, DomError> {
    let escaped = escape_stray_lt(markup);
    let markup = escaped.as_ref();
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_html::LANGUAGE.into())
        .map_err(|e| DomError::Parse(format!("Failed to set tree-sitter-html language: {e}")))?;

    let tree = parser
        .parse(markup, None)
        .ok_or_else(|| DomError::Parse("tree-sitter returned no tree".to_string()))?;
    let root = tree.root_node();

    Ok(collect_content(root, markup, 0, markup.len()))
}

/// Turns a `<` that is not followed by a tag name into `&lt;`, the way an
/// HTML tokenizer emits it as text.
fn escape_stray_lt(markup: &str) -> Cow<'_, str> {
    let lower = markup.to_ascii_lowercase();
    let mut out = String::new();
    let mut last = 0;
    let mut search = 0;

    while let Some(found) = lower.get(search..).and_then(|rest| rest.find('<')) {
        let index = search + found;
        let rest = lower.get(index + 1..).unwrap_or_default();
        search = index + 1;

        if let Some(tag) = RAW_TEXT_ELEMENTS.iter().find(|tag| opens_tag_named(rest, tag)) {
            // Raw text runs to the matching end tag.
            let close = format!("</{tag}");
            search = lower
                .get(search..)
                .and_then(|rest| rest.find(&close))
                .map_or(lower.len(), |at| search + at);
            continue;
        }
        if rest.starts_with(|c: char| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')) {
            continue;
        }
        out.push_str(markup.get(last..index).unwrap_or_default());
        out.push_str("&lt;");
        last = index + 1;
    }

    if last == 0 {
        return Cow::Borrowed(markup);
    }
    out.push_str(markup.get(last..).unwrap_or_default());
    Cow::Owned(out)
}

fn opens_tag_named(rest: &str, tag: &str) -> bool {
    rest.strip_prefix(tag)
        .is_some_and(|after| !after.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '-'))
}

/// Converts the children of `node` lying in `start..end` into fragment nodes.
///
/// Whitespace is not part of the grammar's text tokens, so the gaps between
/// children are kept as text.
fn collect_content(node: Node<'_>, source: &str, start: usize, end: usize) -> Vec<FragmentNode> {
    let mut out = Vec::new();
    let mut offset = start;
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();

    for child in children {
        if child.end_byte() <= start || child.start_byte() >= end {
            continue;
        }
        if child.start_byte() > offset {
            push_text(&mut out, &decode_entities(slice(source, offset, child.start_byte())));
        }

        match child.kind() {
            "raw_text" => push_text(&mut out, node_text(child, source)),
            "text" | "entity" => push_text(&mut out, &decode_entities(node_text(child, source))),
            "element" | "script_element" | "style_element" => match convert_element(child, source) {
                Some((element, trailing)) => {
                    out.push(FragmentNode::Element(element));
                    for node in trailing {
                        push_node(&mut out, node);
                    }
                }
                None => push_text(&mut out, node_text(child, source)),
            },
            "comment" | "doctype" | "erroneous_end_tag" => {}
            // Unparsable input is kept as text.
            _ => push_text(&mut out, &decode_entities(node_text(child, source))),
        }
        offset = child.end_byte();
    }

    if end > offset {
        push_text(&mut out, &decode_entities(slice(source, offset, end)));
    }
    out
}

/// Converts an element node.
///
/// The grammar may nest the content following a void element inside it. That
/// content is returned separately so the caller can place it after the element.
fn convert_element(node: Node<'_>, source: &str) -> Option<(FragmentElement, Vec<FragmentNode>)> {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();

    let start_tag =
        children.iter().find(|c| matches!(c.kind(), "start_tag" | "self_closing_tag"))?;
    let (tag, attrs) = read_tag(*start_tag, source)?;

    if start_tag.kind() == "self_closing_tag" {
        return Some((FragmentElement { tag, attrs, children: Vec::new() }, Vec::new()));
    }

    let content_end = children
        .iter()
        .find(|c| c.kind() == "end_tag")
        .map_or(node.end_byte(), |end_tag| end_tag.start_byte());
    let content = collect_content(node, source, start_tag.end_byte(), content_end);

    if VOID_ELEMENTS.contains(&tag.as_str()) {
        return Some((FragmentElement { tag, attrs, children: Vec::new() }, content));
    }
    Some((FragmentElement { tag, attrs, children: content }, Vec::new()))
}

fn read_tag(tag_node: Node<'_>, source: &str) -> Option<(String, Vec<(String, String)>)> {
    let mut cursor = tag_node.walk();
    let mut tag = None;
    let mut attrs = Vec::new();

    for child in tag_node.children(&mut cursor) {
        match child.kind() {
            "tag_name" => {
                tag = Some(node_text(child, source).to_ascii_lowercase());
            }
            "attribute" => {
                if let Some(attr) = read_attribute(child, source) {
                    attrs.push(attr);
                }
            }
            _ => {}
        }
    }

    tag.map(|tag| (tag, attrs))
}

fn read_attribute(node: Node<'_>, source: &str) -> Option<(String, String)> {
    let mut cursor = node.walk();
    let mut name = None;
    let mut value = String::new();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "attribute_name" => name = Some(node_text(child, source).to_ascii_lowercase()),
            "attribute_value" => value = decode_entities(node_text(child, source)),
            "quoted_attribute_value" => {
                let mut inner_cursor = child.walk();
                value = child
                    .children(&mut inner_cursor)
                    .find(|c| c.kind() == "attribute_value")
                    .map(|c| decode_entities(node_text(c, source)))
                    .unwrap_or_default();
            }
            _ => {}
        }
    }

    name.map(|name| (name, value))
}

fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    slice(source, node.start_byte(), node.end_byte())
}

fn slice(source: &str, start: usize, end: usize) -> &str {
    source.get(start..end).unwrap_or_default()
}

fn push_node(out: &mut Vec<FragmentNode>, node: FragmentNode) {
    match node {
        FragmentNode::Text(text) => push_text(out, &text),
        element @ FragmentNode::Element(_) => out.push(element),
    }
}

fn push_text(out: &mut Vec<FragmentNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(FragmentNode::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(FragmentNode::Text(text.to_string()));
    }
}

/// Decodes named and numeric character references.
///
/// Unknown named references are kept verbatim.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    RE_ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let body = caps.get(1).map_or("", |m| m.as_str());
            decode_reference(body).map_or_else(|| whole.to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn decode_reference(body: &str) -> Option<char> {
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = body.strip_prefix('#') {
        return dec.parse().ok().and_then(char::from_u32);
    }
    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "shy" => '\u{ad}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "bull" => '•',
        "middot" => '·',
        "times" => '×',
        _ => return None,
    };
    Some(c)
}
