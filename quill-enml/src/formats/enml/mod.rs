//! ENML format implementation (editor HTML → note markup, the save path)
//!
//! Pipeline:
//! 1. Strip the editor's HTML envelope down to the body content and wrap it
//!    in the note markup document envelope.
//! 2. Run the external well-formed-HTML repair pass; empty output aborts
//!    the whole conversion.
//! 3. Drop the `<form>` wrapper the repair tool inserts, then substitute
//!    encryption placeholders at the text level.
//! 4. Parse into a DOM tree and run the structural element rewrite,
//!    accumulating the resource reference sequence.
//! 5. Serialize the body content, repair the dialect's void elements, and
//!    wrap the result in the XML declaration / DOCTYPE / `<en-note>`
//!    envelope.
//!
//! Failures local to one sub-region (an unresolved encryption slot, a
//! malformed resource identifier) never abort the pipeline; they are
//! reported through [`EnmlConversion`] so the caller can decide whether a
//! partial result is safe to persist.

use crate::crypt::{self, NoteCipher, PasswordStore};
use crate::dom;
use crate::error::EnmlError;
use crate::normalize::HtmlNormalizer;
use crate::policy::TagPolicy;
use crate::repair::repair_void_elements;
use crate::rewrite::rewrite_document;
use serde::Serialize;

/// Style attribute carried by the note markup root element.
pub const NOTE_STYLE: &str =
    "word-wrap: break-word; -webkit-nbsp-mode: space; -webkit-line-break: after-white-space;";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const ENML_DOCTYPE: &str =
    "<!DOCTYPE en-note SYSTEM 'http://xml.evernote.com/pub/enml2.dtd'>";

/// Result of one save conversion.
#[derive(Debug, Clone, Serialize)]
pub struct EnmlConversion {
    /// The complete note markup document.
    pub enml: String,
    /// Resource identifiers still referenced by the document, in document
    /// order, duplicates preserved. The persistence layer reconciles
    /// orphaned resources against this sequence.
    pub resources: Vec<i32>,
    /// Encryption slots that had no password store entry. Non-empty means
    /// the document still contains unencrypted placeholder blocks and
    /// should not be persisted as-is.
    pub unresolved_slots: Vec<String>,
}

impl EnmlConversion {
    /// Whether every sub-region of the document converted cleanly.
    pub fn is_complete(&self) -> bool {
        self.unresolved_slots.is_empty()
    }
}

/// Converter from editor HTML to note markup.
///
/// Owns the tag policy and the injected collaborators: the external
/// well-formed-HTML repair pass and the encryption primitive. The password
/// store is per-session state and is passed into each [`convert`] call.
///
/// [`convert`]: EnmlFormat::convert
pub struct EnmlFormat {
    policy: TagPolicy,
    normalizer: Box<dyn HtmlNormalizer>,
    cipher: Box<dyn NoteCipher>,
}

impl EnmlFormat {
    pub fn new(normalizer: Box<dyn HtmlNormalizer>, cipher: Box<dyn NoteCipher>) -> Self {
        EnmlFormat {
            policy: TagPolicy::default(),
            normalizer,
            cipher,
        }
    }

    pub fn with_policy(mut self, policy: TagPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &TagPolicy {
        &self.policy
    }

    /// Convert one editor document to note markup.
    pub fn convert(
        &self,
        html: &str,
        passwords: &PasswordStore,
    ) -> Result<EnmlConversion, EnmlError> {
        // The rendering surface emits a closing tag for void inputs.
        let html = html.replace("</input>", "");
        let body = extract_body_content(&html).unwrap_or(&html);
        let wrapped = format!(
            "{XML_DECLARATION}\n{ENML_DOCTYPE}\n<html><head><title></title></head>\
             <body style=\"{NOTE_STYLE}\">{body}</body></html>"
        );

        let normalized = self.normalizer.normalize(wrapped.as_bytes())?;
        if normalized.is_empty() {
            return Err(EnmlError::Normalization(
                "external HTML repair produced no output".to_string(),
            ));
        }
        let mut text = String::from_utf8_lossy(&normalized).into_owned();
        text = text.replace("<form>", "").replace("</form>", "");

        let crypt = crypt::transform_encryption_blocks(&text, passwords, self.cipher.as_ref())?;

        let dom = dom::parse_html(&crypt.content);
        let body_node = dom::find_body(&dom).ok_or_else(|| {
            EnmlError::Parse("normalized document has no <body> element".to_string())
        })?;
        let outcome = rewrite_document(&body_node, &self.policy);

        let inner = dom::serialize_children(&body_node)?;
        // The HTML serializer writes non-breaking spaces as a named entity,
        // which XML parsers reject without the external DTD.
        let inner = repair_void_elements(&inner).replace("&nbsp;", "&#160;");

        let enml =
            format!("{XML_DECLARATION}\n{ENML_DOCTYPE}\n<en-note style=\"{NOTE_STYLE}\">{inner}</en-note>");

        Ok(EnmlConversion {
            enml,
            resources: outcome.resources,
            unresolved_slots: crypt.unresolved_slots,
        })
    }
}

/// Inner content of the first `<body>` element, if the document has one.
fn extract_body_content(html: &str) -> Option<&str> {
    let open = html.find("<body")?;
    let start = open + html[open..].find('>')? + 1;
    let end = start + html[start..].find("</body")?;
    Some(&html[start..end])
}

/// Validate stored note markup against the policy's closed element set.
///
/// Returns the disallowed tag names in document order, or a parse error if
/// the markup is not well-formed XML. An empty result means the document
/// satisfies whitelist closure.
pub fn validate(enml: &str, policy: &TagPolicy) -> Result<Vec<String>, EnmlError> {
    // Stored documents carry the dialect DOCTYPE, which the XML parser
    // rejects unless DTDs are explicitly allowed.
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(enml, options)
        .map_err(|e| EnmlError::Parse(format!("invalid note markup: {e}")))?;
    Ok(doc
        .descendants()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name().to_string())
        .filter(|name| !policy.element_allowed(name))
        .collect())
}
