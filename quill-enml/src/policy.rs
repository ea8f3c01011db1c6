//! Tag and attribute policy for the note markup dialect
//!
//! The dialect is a closed set: anything outside these tables cannot be
//! persisted and gets deleted during rewriting. Attributes work the other
//! way around: a short deny-list of names that must never survive a save
//! (event handlers, identity attributes, editor-internal bookkeeping).
//!
//! The policy is immutable after construction and passed by reference into
//! the rewriter; there is no global state.

use std::collections::HashSet;

/// Element names allowed in stored note markup, lowercase.
const ALLOWED_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "address", "area", "b", "bdo", "big", "blockquote", "br", "caption",
    "center", "cite", "code", "col", "colgroup", "dd", "del", "dfn", "div", "dl", "dt", "em",
    "en-media", "en-crypt", "en-todo", "en-note", "font", "h1", "h2", "h3", "h4", "h5", "h6",
    "hr", "i", "img", "ins", "kbd", "li", "map", "ol", "p", "pre", "q", "s", "samp", "small",
    "span", "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead",
    "title", "tr", "tt", "u", "ul", "var", "xmp",
];

/// Attribute names that must never survive a save. Anything starting with
/// "on" is also forbidden regardless of this table.
const FORBIDDEN_ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "accesskey",
    "data",
    "dynsrc",
    "tabindex",
    // editor-internal bookkeeping attributes
    "en-tag",
    "src",
    "en-new",
    "guid",
    "lid",
];

/// Immutable whitelist tables driving the element rewriter
#[derive(Debug, Clone)]
pub struct TagPolicy {
    allowed_elements: HashSet<&'static str>,
    forbidden_attributes: HashSet<&'static str>,
}

impl Default for TagPolicy {
    fn default() -> Self {
        TagPolicy {
            allowed_elements: ALLOWED_ELEMENTS.iter().copied().collect(),
            forbidden_attributes: FORBIDDEN_ATTRIBUTES.iter().copied().collect(),
        }
    }
}

impl TagPolicy {
    /// Whether an element name may appear in stored markup. Case-insensitive.
    pub fn element_allowed(&self, tag: &str) -> bool {
        let tag = tag.trim().to_ascii_lowercase();
        self.allowed_elements.contains(tag.as_str())
    }

    /// Whether an attribute name may survive a save. Case-insensitive.
    pub fn attribute_allowed(&self, name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        if name.starts_with("on") {
            return false;
        }
        !self.forbidden_attributes.contains(name.as_str())
    }

    /// All allowed element names, for diagnostics.
    pub fn allowed_elements(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.allowed_elements.iter().copied()
    }
}
