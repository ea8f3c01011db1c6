//! Encryption placeholder substitution
//!
//! While a note is open, encrypted sections are represented as placeholder
//! tables carrying a class marker and a "slot" attribute. The slot indexes
//! into a transient password store kept by the editor session. At save time
//! this pass runs over the normalized document text, before structural
//! rewriting, and replaces each placeholder with a self-contained
//! `<en-crypt>` element.
//!
//! This is deliberately a text-level pass: the placeholder is an arbitrary
//! nested table and the replacement must span from its opening tag to the
//! nearest matching closing tag, which the tree pass has no business
//! modeling. Pre-condition: input is the tidy-repaired document. Post:
//! every placeholder whose slot resolved is replaced; unresolved slots are
//! reported and their blocks left untouched.

use crate::error::EnmlError;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Opening-tag prefix marking an encryption placeholder.
const BLOCK_MARKER: &str = "<table class=\"en-crypt-temp\"";
/// The nearest occurrence of this sequence terminates a placeholder block.
const BLOCK_END: &str = "</table>";

static SLOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"slot="([^"]*)""#).unwrap());
static PAYLOAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<td[^>]*>(.*?)</td>").unwrap());

/// Encryption primitive collaborator: (plaintext, password) → ciphertext.
///
/// The cipher name and key length reported here are recorded verbatim in the
/// output markup, so they must describe what `encrypt` actually performs.
pub trait NoteCipher {
    /// Cipher name recorded in the `cipher` attribute (e.g. "RC2").
    fn cipher_name(&self) -> &str;
    /// Key length in bits recorded in the `length` attribute.
    fn key_length(&self) -> u32;
    /// Produce ciphertext from plaintext and password.
    fn encrypt(&self, plaintext: &str, password: &str) -> Result<String, EnmlError>;
}

/// Cipher stand-in for callers that cannot encrypt (e.g. batch tools with no
/// session password store). Safe to pair with an empty [`PasswordStore`]:
/// blocks only reach the cipher when their slot resolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCipher;

impl NoteCipher for UnavailableCipher {
    fn cipher_name(&self) -> &str {
        "none"
    }

    fn key_length(&self) -> u32 {
        0
    }

    fn encrypt(&self, _plaintext: &str, _password: &str) -> Result<String, EnmlError> {
        Err(EnmlError::Encryption(
            "no encryption primitive configured".to_string(),
        ))
    }
}

/// Transient slot → (password, hint) mapping, owned by the editor session.
/// The transformer only reads it.
#[derive(Debug, Default, Clone)]
pub struct PasswordStore {
    entries: HashMap<String, (String, String)>,
}

impl PasswordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the password and hint for a slot.
    pub fn insert(&mut self, slot: impl Into<String>, password: impl Into<String>, hint: impl Into<String>) {
        self.entries
            .insert(slot.into(), (password.into(), hint.into()));
    }

    pub fn get(&self, slot: &str) -> Option<&(String, String)> {
        self.entries.get(slot)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of the placeholder substitution pass.
#[derive(Debug, Clone)]
pub struct CryptOutcome {
    /// Document text with every resolvable placeholder replaced.
    pub content: String,
    /// Slots with no password store entry; their blocks were left in place.
    pub unresolved_slots: Vec<String>,
}

/// Replace every encryption placeholder in `content` with an `<en-crypt>`
/// element. Block boundaries use the nearest closing sequence after each
/// marker, so independent blocks never bleed into each other.
pub fn transform_encryption_blocks(
    content: &str,
    store: &PasswordStore,
    cipher: &dyn NoteCipher,
) -> Result<CryptOutcome, EnmlError> {
    let mut out = String::with_capacity(content.len());
    let mut unresolved_slots = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find(BLOCK_MARKER) {
        out.push_str(&rest[..start]);
        let block_and_tail = &rest[start..];

        let Some(end) = block_and_tail.find(BLOCK_END) else {
            // Unterminated placeholder; pass the remainder through untouched.
            out.push_str(block_and_tail);
            rest = "";
            break;
        };
        let block = &block_and_tail[..end + BLOCK_END.len()];
        rest = &block_and_tail[end + BLOCK_END.len()..];

        let slot = SLOT_RE
            .captures(block)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        match store.get(&slot) {
            Some((password, hint)) => {
                let plaintext = PAYLOAD_RE
                    .captures(block)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default();
                let ciphertext = cipher.encrypt(&plaintext, password)?;
                out.push_str(&format!(
                    "<en-crypt cipher=\"{}\" length=\"{}\" hint=\"{}\">{}</en-crypt>",
                    cipher.cipher_name(),
                    cipher.key_length(),
                    escape_attribute(hint),
                    ciphertext
                ));
            }
            None => {
                warn!("encryption slot {slot:?} has no password entry; leaving block unencrypted");
                unresolved_slots.push(slot);
                out.push_str(block);
            }
        }
    }
    out.push_str(rest);

    Ok(CryptOutcome {
        content: out,
        unresolved_slots,
    })
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
