//! Round-trip tests: a saved note must load back into editable HTML.

use crate::common::passthrough_format;
use quill_enml::{format_for_editor, PasswordStore};

fn save(body: &str) -> String {
    let input = format!("<html><head></head><body>{body}</body></html>");
    passthrough_format()
        .convert(&input, &PasswordStore::new())
        .unwrap()
        .enml
}

#[test]
fn saved_note_loads_back_for_editing() {
    let enml = save("<div>Hello <b>world</b></div>");
    let html = format_for_editor(&enml).unwrap();

    assert!(html.starts_with("<html>"));
    assert!(html.contains("<div>Hello <b>world</b></div>"));
    // The note root's style lands on the editor body.
    assert!(html.contains("<body style=\"word-wrap: break-word;"));
}

#[test]
fn todo_round_trips_to_a_checkbox() {
    let enml = save("<div><input type=\"checkbox\" checked=\"checked\"/>task</div>");
    let html = format_for_editor(&enml).unwrap();

    assert!(html.contains("<input type=\"checkbox\" en-tag=\"en-todo\" checked=\"checked\"/>task"));
}

#[test]
fn media_round_trips_to_an_editor_image() {
    let enml = save("<img en-tag=\"en-media\" lid=\"5\" hash=\"9f\" type=\"image/png\"/>");
    let html = format_for_editor(&enml).unwrap();

    assert!(html.contains("<img en-tag=\"en-media\""));
    assert!(html.contains("hash=\"9f\""));
}

#[test]
fn encrypted_section_round_trips_to_a_locked_placeholder() {
    let mut passwords = PasswordStore::new();
    passwords.insert("1", "pw", "pet name");
    let input = "<html><body><table class=\"en-crypt-temp\" slot=\"1\">\
                 <tbody><tr><td>secret</td></tr></tbody></table></body></html>";
    let enml = passthrough_format().convert(input, &passwords).unwrap().enml;

    let html = format_for_editor(&enml).unwrap();

    assert!(html.contains("en-tag=\"en-crypt\""));
    assert!(html.contains("hint=\"pet name\""));
    assert!(html.contains("alt=\"ct(terces|pw)\""));
    assert!(!html.contains("secret"));
}
