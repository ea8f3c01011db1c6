//! Save pipeline tests (editor HTML → note markup)
//!
//! These run the full conversion with an in-process pass-through
//! normalizer, so everything after the subprocess boundary is exercised
//! for real: envelope handling, structural rewriting, resource tracking,
//! void element repair and whitelist closure.

use crate::common::{passthrough_format, SilentNormalizer, TaggingCipher};
use quill_enml::{validate, EnmlError, EnmlFormat, PasswordStore, TagPolicy, NOTE_STYLE};

fn save(html: &str) -> quill_enml::EnmlConversion {
    passthrough_format().convert(html, &PasswordStore::new()).unwrap()
}

fn editor_doc(body: &str) -> String {
    format!("<html><head><title>n</title></head><body>{body}</body></html>")
}

#[test]
fn save_produces_the_storage_envelope() {
    let result = save(&editor_doc("<div>Hello</div>"));

    assert!(result.enml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(result
        .enml
        .contains("<!DOCTYPE en-note SYSTEM 'http://xml.evernote.com/pub/enml2.dtd'>"));
    assert!(result.enml.contains(&format!("<en-note style=\"{NOTE_STYLE}\">")));
    assert!(result.enml.ends_with("</en-note>"));
    assert!(result.enml.contains("<div>Hello</div>"));
    assert!(result.is_complete());
    assert!(result.resources.is_empty());
}

#[test]
fn bare_fragment_without_an_envelope_is_accepted() {
    let result = save("<p>loose paragraph</p>");
    assert!(result.enml.contains("<p>loose paragraph</p>"));
}

#[test]
fn checkbox_is_persisted_as_self_closed_en_todo() {
    let result = save(&editor_doc(
        "<div><input type=\"checkbox\" checked=\"checked\"/>call mom</div>",
    ));

    assert!(result.enml.contains("<en-todo checked=\"true\"/>call mom"));
    assert!(!result.enml.contains("<input"));
    assert!(!result.enml.contains("</en-todo>"));
}

#[test]
fn media_references_are_collected_in_document_order() {
    let result = save(&editor_doc(
        "<img en-tag=\"en-media\" lid=\"3\" hash=\"aa\" type=\"image/png\"/>\
         <object type=\"application/pdf\" lid=\"42\" hash=\"bb\"></object>\
         <img en-tag=\"en-media\" lid=\"3\" hash=\"aa\" type=\"image/png\"/>",
    ));

    assert_eq!(result.resources, vec![3, 42, 3]);
    assert!(result.enml.contains("<en-media"));
    assert!(!result.enml.contains("</en-media>"));
    assert!(!result.enml.contains("lid="));
}

#[test]
fn unknown_elements_do_not_reach_storage() {
    let result = save(&editor_doc(
        "<p>keep</p><script>alert(1)</script><video src=\"x.mp4\">gone</video>",
    ));

    assert!(result.enml.contains("<p>keep</p>"));
    assert!(!result.enml.contains("script"));
    assert!(!result.enml.contains("video"));
}

#[test]
fn saved_markup_satisfies_whitelist_closure() {
    let result = save(&editor_doc(
        "<div id=\"d\"><span id=\"s\" style=\"color:red\">styled</span>\
         <input type=\"checkbox\"/>todo\
         <a href=\"http://example.com\" onclick=\"x()\">link</a>\
         <img en-tag=\"en-media\" lid=\"7\" hash=\"cc\" type=\"image/jpeg\"/>\
         <table><tbody><tr><td>cell</td></tr></tbody></table></div>",
    ));

    let violations = validate(&result.enml, &TagPolicy::default()).unwrap();
    assert!(violations.is_empty(), "unexpected violations: {violations:?}");
}

#[test]
fn non_breaking_spaces_survive_as_numeric_references() {
    let result = save(&editor_doc("<p>one\u{a0}two</p>"));

    assert!(result.enml.contains("one&#160;two"));
    assert!(!result.enml.contains("&nbsp;"));
    // And the stored document stays parseable as XML.
    validate(&result.enml, &TagPolicy::default()).unwrap();
}

#[test]
fn empty_normalizer_output_fails_the_whole_conversion() {
    let format = EnmlFormat::new(Box::new(SilentNormalizer), Box::new(TaggingCipher));
    let err = format
        .convert(&editor_doc("<p>x</p>"), &PasswordStore::new())
        .unwrap_err();
    assert!(matches!(err, EnmlError::Normalization(_)));
}
