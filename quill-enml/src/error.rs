//! Error types for note markup conversion

use std::fmt;

/// Errors that can occur while converting between editor HTML and note markup
///
/// Failures scoped to a single sub-region of a document (one encrypted block,
/// one malformed resource identifier) are reported through the conversion
/// result instead; only whole-document failures surface here.
#[derive(Debug, Clone, PartialEq)]
pub enum EnmlError {
    /// The external well-formed-HTML repair pass produced no usable output
    Normalization(String),
    /// Error parsing markup into a document tree
    Parse(String),
    /// Error serializing a document tree back to markup
    Serialization(String),
    /// The encryption primitive failed
    Encryption(String),
}

impl fmt::Display for EnmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnmlError::Normalization(msg) => write!(f, "Normalization error: {msg}"),
            EnmlError::Parse(msg) => write!(f, "Parse error: {msg}"),
            EnmlError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            EnmlError::Encryption(msg) => write!(f, "Encryption error: {msg}"),
        }
    }
}

impl std::error::Error for EnmlError {}
