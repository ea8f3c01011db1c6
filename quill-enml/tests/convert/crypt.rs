//! Save pipeline tests for the encryption placeholder substitution.

use crate::common::{passthrough_format, PassthroughNormalizer};
use quill_enml::{EnmlFormat, PasswordStore, UnavailableCipher};

fn placeholder(slot: &str, text: &str) -> String {
    format!("<table class=\"en-crypt-temp\" slot=\"{slot}\"><tbody><tr><td>{text}</td></tr></tbody></table>")
}

fn editor_doc(body: &str) -> String {
    format!("<html><head></head><body>{body}</body></html>")
}

#[test]
fn placeholder_block_is_encrypted_on_save() {
    let mut passwords = PasswordStore::new();
    passwords.insert("1", "pw", "the hint");
    let input = editor_doc(&format!("<p>before</p>{}<p>after</p>", placeholder("1", "secret")));

    let result = passthrough_format().convert(&input, &passwords).unwrap();

    assert!(result
        .enml
        .contains("<en-crypt cipher=\"AES\" length=\"128\" hint=\"the hint\">ct(terces|pw)</en-crypt>"));
    assert!(!result.enml.contains("en-crypt-temp"));
    assert!(!result.enml.contains("secret"));
    assert!(result.is_complete());
}

#[test]
fn unresolved_slot_yields_a_partial_result() {
    let input = editor_doc(&format!("<p>text</p>{}", placeholder("9", "secret")));

    let result = passthrough_format()
        .convert(&input, &PasswordStore::new())
        .unwrap();

    assert_eq!(result.unresolved_slots, vec!["9".to_string()]);
    assert!(!result.is_complete());
    // The placeholder stays in the document so nothing is lost.
    assert!(result.enml.contains("en-crypt-temp"));
    assert!(result.enml.contains("secret"));
}

#[test]
fn batch_conversion_without_a_cipher_still_succeeds() {
    // A caller with no session passwords pairs the unavailable cipher with
    // an empty store; the cipher is never reached.
    let format = EnmlFormat::new(Box::new(PassthroughNormalizer), Box::new(UnavailableCipher));
    let input = editor_doc(&format!("<p>x</p>{}", placeholder("1", "locked")));

    let result = format.convert(&input, &PasswordStore::new()).unwrap();

    assert_eq!(result.unresolved_slots, vec!["1".to_string()]);
}

#[test]
fn two_blocks_with_mixed_resolution() {
    let mut passwords = PasswordStore::new();
    passwords.insert("2", "pw2", "h2");
    let input = editor_doc(&format!(
        "{}{}",
        placeholder("1", "keepme"),
        placeholder("2", "lockme")
    ));

    let result = passthrough_format().convert(&input, &passwords).unwrap();

    assert_eq!(result.unresolved_slots, vec!["1".to_string()]);
    assert!(result.enml.contains("ct(emkcol|pw2)"));
    assert!(!result.enml.contains("lockme"));
    assert!(result.enml.contains("keepme"));
}
