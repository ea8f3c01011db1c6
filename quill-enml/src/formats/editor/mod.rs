//! Editor format implementation (note markup → editable HTML, the load path)
//!
//! The reverse of the save pipeline, and deliberately much simpler: stored
//! markup is trusted (it passed whitelisting when saved), so this pass only
//! rewrites the dialect's own elements into the editable forms the
//! rendering surface understands and leaves everything else untouched.
//!
//! Dialect rewrites:
//! - `en-note`  → the `<body>` of a plain HTML document
//! - `en-todo`  → `<input type="checkbox" en-tag="en-todo">`
//! - `en-media` → `<img en-tag="en-media">` (or an `<object>` for PDF
//!   types); the persistence layer later resolves `hash` to local content
//! - `en-crypt` → a locked placeholder image carrying the ciphertext in
//!   its `alt` attribute, mirroring what the save path reads back
//!
//! Stored markup is well-formed XML, so this side parses with an XML
//! parser rather than the HTML machinery: the dialect's self-closed
//! elements (`<en-todo/>`) would otherwise swallow their following
//! siblings under HTML parsing rules.

use crate::error::EnmlError;
use roxmltree::{Document, Node, ParsingOptions};

/// Convert stored note markup into a ready-to-display editable HTML
/// document.
pub fn format_for_editor(enml: &str) -> Result<String, EnmlError> {
    // Stored documents carry the dialect DOCTYPE, which the XML parser
    // rejects unless DTDs are explicitly allowed.
    let options = ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(enml, options)
        .map_err(|e| EnmlError::Parse(format!("invalid note markup: {e}")))?;
    let root = doc.root_element();
    if root.tag_name().name() != "en-note" {
        return Err(EnmlError::Parse(format!(
            "expected <en-note> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut body = String::new();
    for child in root.children() {
        emit_node(child, &mut body);
    }

    let style = root.attribute("style").unwrap_or_default();
    Ok(format!(
        "<html><head><meta http-equiv=\"content-type\" content=\"text/html; charset=utf-8\">\
         </head><body style=\"{}\">{}</body></html>",
        escape_attribute(style),
        body
    ))
}

fn emit_node(node: Node, out: &mut String) {
    if node.is_text() {
        out.push_str(&escape_text(node.text().unwrap_or_default()));
        return;
    }
    if !node.is_element() {
        return;
    }

    match node.tag_name().name() {
        "en-todo" => emit_todo(node, out),
        "en-media" => emit_media(node, out),
        "en-crypt" => emit_crypt(node, out),
        tag => emit_passthrough(node, tag, out),
    }
}

fn emit_todo(node: Node, out: &mut String) {
    out.push_str("<input type=\"checkbox\" en-tag=\"en-todo\"");
    if node.attribute("checked") == Some("true") {
        out.push_str(" checked=\"checked\"");
    }
    out.push_str("/>");
}

fn emit_media(node: Node, out: &mut String) {
    let is_pdf = node
        .attribute("type")
        .map(|t| t.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    let tag = if is_pdf { "object" } else { "img" };

    out.push('<');
    out.push_str(tag);
    out.push_str(" en-tag=\"en-media\"");
    for attr in node.attributes() {
        out.push(' ');
        out.push_str(attr.name());
        out.push_str("=\"");
        out.push_str(&escape_attribute(attr.value()));
        out.push('"');
    }
    if is_pdf {
        out.push_str("></object>");
    } else {
        out.push_str("/>");
    }
}

fn emit_crypt(node: Node, out: &mut String) {
    let ciphertext = node.text().unwrap_or_default();
    out.push_str("<img en-tag=\"en-crypt\"");
    for name in ["cipher", "length", "hint"] {
        if let Some(value) = node.attribute(name) {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }
    out.push_str(" alt=\"");
    out.push_str(&escape_attribute(ciphertext));
    out.push_str("\"/>");
}

/// HTML void elements that must not get a closing tag on the editor side.
const HTML_VOID: &[&str] = &["br", "hr", "img", "area", "col"];

fn emit_passthrough(node: Node, tag: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for attr in node.attributes() {
        out.push(' ');
        out.push_str(attr.name());
        out.push_str("=\"");
        out.push_str(&escape_attribute(attr.value()));
        out.push('"');
    }
    if HTML_VOID.contains(&tag) {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in node.children() {
        emit_node(child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
