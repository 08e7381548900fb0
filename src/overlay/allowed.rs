/// Text-level elements a translation may create.
const ALLOWED_ELEMENTS: &[&str] = &[
    "a", "em", "strong", "small", "s", "cite", "q", "dfn", "abbr", "data", "time", "code", "var",
    "samp", "kbd", "sub", "sup", "i", "b", "u", "mark", "ruby", "rt", "rp", "bdi", "bdo", "span",
    "br", "wbr",
];

/// Attributes a translation may set on any element.
const GLOBAL_ATTRIBUTES: &[&str] = &["title", "aria-label", "aria-valuetext", "aria-moz-hint"];

/// Attributes a translation may set on specific elements.
const ELEMENT_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["download"]),
    ("area", &["download", "alt"]),
    ("button", &["accesskey"]),
    ("img", &["alt"]),
    // `value` is handled separately, see `is_attr_allowed`.
    ("input", &["alt", "placeholder"]),
    ("menu", &["label"]),
    ("menuitem", &["label"]),
    ("optgroup", &["label"]),
    ("option", &["label"]),
    ("textarea", &["placeholder"]),
    ("th", &["abbr"]),
    ("track", &["label"]),
];

/// Input types whose `value` is a label rather than user data.
const BUTTON_INPUT_TYPES: &[&str] = &["submit", "button", "reset"];

#[must_use]
pub fn is_element_allowed(tag: &str) -> bool {
    ALLOWED_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Whether a translation may set `attr` on a `tag` element.
///
/// `input_type` is the `type` attribute of the element, if any; inputs
/// without one are text inputs.
#[must_use]
pub fn is_attr_allowed(attr: &str, tag: &str, input_type: Option<&str>) -> bool {
    let attr = attr.to_ascii_lowercase();
    let tag = tag.to_ascii_lowercase();

    if GLOBAL_ATTRIBUTES.contains(&attr.as_str()) {
        return true;
    }
    let Some((_, allowed)) = ELEMENT_ATTRIBUTES.iter().find(|(name, _)| *name == tag) else {
        return false;
    };
    if allowed.contains(&attr.as_str()) {
        return true;
    }

    tag == "input" && attr == "value" && {
        let input_type = input_type.unwrap_or("text").trim().to_ascii_lowercase();
        BUTTON_INPUT_TYPES.contains(&input_type.as_str())
    }
}
