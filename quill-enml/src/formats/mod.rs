//! Conversion directions
//!
//! Each submodule owns one direction of the editor ⇄ storage round trip:
//! `enml` produces validated note markup from editor HTML (the save path),
//! `editor` produces ready-to-display HTML from stored markup (the load
//! path).

pub mod editor;
pub mod enml;

pub use editor::format_for_editor;
pub use enml::{EnmlConversion, EnmlFormat};
