//! Shared collaborators for pipeline-level tests.

use quill_enml::{EnmlError, EnmlFormat, HtmlNormalizer, NoteCipher};

/// Normalizer that hands the document back untouched, standing in for the
/// external repair subprocess. Pipeline tests feed it markup that is
/// already well-formed.
pub struct PassthroughNormalizer;

impl HtmlNormalizer for PassthroughNormalizer {
    fn normalize(&self, input: &[u8]) -> Result<Vec<u8>, EnmlError> {
        Ok(input.to_vec())
    }
}

/// Normalizer that produces nothing, simulating a crashed repair tool.
pub struct SilentNormalizer;

impl HtmlNormalizer for SilentNormalizer {
    fn normalize(&self, _input: &[u8]) -> Result<Vec<u8>, EnmlError> {
        Ok(Vec::new())
    }
}

/// Deterministic test cipher. The plaintext is reversed so tests can
/// assert it never survives verbatim in the output document.
pub struct TaggingCipher;

impl NoteCipher for TaggingCipher {
    fn cipher_name(&self) -> &str {
        "AES"
    }

    fn key_length(&self) -> u32 {
        128
    }

    fn encrypt(&self, plaintext: &str, password: &str) -> Result<String, EnmlError> {
        let scrambled: String = plaintext.chars().rev().collect();
        Ok(format!("ct({scrambled}|{password})"))
    }
}

pub fn passthrough_format() -> EnmlFormat {
    EnmlFormat::new(Box::new(PassthroughNormalizer), Box::new(TaggingCipher))
}
