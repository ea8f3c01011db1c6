//! DOM helpers over the html5ever / rcdom stack
//!
//! Thin wrappers used by the structural rewrite pass: parsing editor HTML
//! into an rcdom tree, building replacement elements, attribute access, and
//! serializing a subtree back to markup text.

use crate::error::EnmlError;
use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, serialize, Attribute, LocalName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Parse an HTML byte stream into an rcdom tree.
pub fn parse_html(input: &str) -> RcDom {
    html5ever::parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .one(input.as_bytes())
}

/// Find the first `<body>` element in a parsed document.
pub fn find_body(dom: &RcDom) -> Option<Handle> {
    find_element(&dom.document, "body")
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if element_name(node).as_deref() == Some(tag) {
        return Some(node.clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

/// Lowercased local name of an element node, or None for non-elements.
pub fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
        _ => None,
    }
}

/// Create an element node with the given attributes.
pub fn create_element(tag: &str, attrs: Vec<(String, String)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name.as_str())),
            value: value.into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node.
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Value of the named attribute, if present. Names compare case-insensitively.
pub fn get_attribute(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Whether the element carries the named attribute, with any value.
pub fn has_attribute(node: &Handle, name: &str) -> bool {
    get_attribute(node, name).is_some()
}

/// Remove the named attribute if present.
pub fn remove_attribute(node: &Handle, name: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs
            .borrow_mut()
            .retain(|a| !a.name.local.as_ref().eq_ignore_ascii_case(name));
    }
}

/// All attributes of an element as owned (name, value) pairs, in order.
pub fn attributes(node: &Handle) -> Vec<(String, String)> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|a| (a.name.local.to_string(), a.value.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Keep only the attributes whose name passes the predicate.
pub fn retain_attributes<F>(node: &Handle, mut keep: F)
where
    F: FnMut(&str) -> bool,
{
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs.borrow_mut().retain(|a| keep(a.name.local.as_ref()));
    }
}

/// Serialize the children of a node to markup text (the node's inner HTML).
pub fn serialize_children(node: &Handle) -> Result<String, EnmlError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    serialize(&mut output, &serializable, opts)
        .map_err(|e| EnmlError::Serialization(format!("HTML serialization failed: {e}")))?;
    String::from_utf8(output)
        .map_err(|e| EnmlError::Serialization(format!("UTF-8 conversion failed: {e}")))
}
