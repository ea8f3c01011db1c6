//! Bidirectional conversion between editable HTML and note markup
//!
//!     This crate owns the round trip between the rendering surface's HTML and
//!     the constrained XML dialect notes are persisted in. The save direction is
//!     the interesting one: browser-grade HTML is lenient, the storage dialect
//!     is a closed whitelist of well-formed XML, so saving is a funnel that
//!     repairs, substitutes, rewrites and validates.
//!
//!     TLDR for contributors:
//!         - The save pipeline lives in formats/enml, the load pipeline in formats/editor.
//!         - Structural work happens on a DOM tree; the encryption substitution and the
//!           void-element repair are deliberately text-level (see those modules for why
//!           a tree pass cannot do them).
//!         - External processes (the HTML repair tool) and cryptography sit behind
//!           traits so tests never need the real thing. See normalize.rs and crypt.rs.
//!         - Every element handler in rewrite.rs has unit tests next to it; pipeline
//!           level behavior is covered in tests/.
//!
//! Architecture
//!
//!     This is a pure lib: it powers the CLI but is shell agnostic. Nothing here
//!     reads env vars (apart from the repair-binary override), prints, or assumes a
//!     terminal.
//!
//!     The file structure:
//!     .
//!     ├── error.rs                # EnmlError
//!     ├── policy.rs               # Element whitelist / attribute deny list
//!     ├── dom.rs                  # Thin helpers over the HTML DOM crate
//!     ├── normalize.rs            # HtmlNormalizer trait + external tidy pass
//!     ├── crypt.rs                # NoteCipher trait, password store, block substitution
//!     ├── rewrite.rs              # Structural element rewrite + resource tracking
//!     ├── repair.rs               # Text-level void element repair
//!     ├── formats
//!     │   ├── enml                # Save path: editor HTML → note markup
//!     │   └── editor              # Load path: note markup → editor HTML
//!     └── lib.rs
//!
//! Core Algorithms
//!
//!     Saving runs a fixed pipeline: strip the editor envelope, hand the document
//!     to an external well-formedness repair pass, substitute encryption
//!     placeholder blocks at the text level, then walk the DOM dispatching each
//!     element to a per-tag handler (keep / replace / unwrap / remove), and
//!     finally serialize and self-close the dialect's void elements. Resource
//!     references are collected during the walk, in document order with
//!     duplicates, so the persistence layer can reconcile orphans.
//!
//!     Sub-region failures do not abort the pipeline. An encryption slot with no
//!     stored password or a malformed resource id degrades that region and is
//!     reported on the result; only a failed repair pass or unparseable output is
//!     a hard error.
//!
//! Library Choices
//!
//!     The save side parses with the browser-grade HTML parser since its input is
//!     whatever the editor produced. The load side parses with an XML parser: the
//!     stored dialect is well-formed XML, and HTML parsing rules would nest the
//!     siblings of self-closed custom elements inside them. Well-formedness
//!     repair is offloaded to the external `tidy` binary rather than reimplemented;
//!     the binary is resolved through `which` and overridable for tests.

pub mod crypt;
pub mod dom;
pub mod error;
pub mod formats;
pub mod normalize;
pub mod policy;
pub mod repair;
pub mod rewrite;

pub use crypt::{NoteCipher, PasswordStore, UnavailableCipher};
pub use error::EnmlError;
pub use formats::editor::format_for_editor;
pub use formats::enml::{validate, EnmlConversion, EnmlFormat, NOTE_STYLE};
pub use normalize::{HtmlNormalizer, TidyNormalizer};
pub use policy::TagPolicy;
