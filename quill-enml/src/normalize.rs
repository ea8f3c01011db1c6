//! External well-formed-HTML repair pass
//!
//! The embedded rendering surface does not always hand back well-formed
//! markup, so the raw editor output is piped through HTML Tidy before any
//! structural rewriting happens. The pass is pluggable behind
//! [`HtmlNormalizer`] so tests (or an in-process parser) can stand in for
//! the subprocess.
//!
//! Tidy is invoked with flags equivalent to "raw, XHTML output, quiet,
//! UTF-8" and fed the document on stdin; the repaired document is read from
//! stdout, blocking until the process exits. Diagnostics on stderr are
//! logged at debug level, except a small set of benign warnings that the
//! editor's own proprietary attributes trigger on every save.

use crate::error::EnmlError;
use log::debug;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use which::which;

/// Pluggable well-formed-HTML repair capability.
///
/// Implementations take the raw editor document and return a repaired,
/// parseable document. Returning an empty output is treated by the caller
/// as a whole-conversion failure.
pub trait HtmlNormalizer {
    fn normalize(&self, input: &[u8]) -> Result<Vec<u8>, EnmlError>;
}

/// Diagnostics the editor intentionally triggers on every save; suppressed
/// so real problems stay visible in the logs.
const BENIGN_DIAGNOSTICS: &[&str] = &[
    "<img> proprietary attribute \"type\"",
    "<img> proprietary attribute \"oncontextmenu\"",
    "<img> proprietary attribute \"hash\"",
    "<img> proprietary attribute \"en-tag\"",
    "<img> proprietary attribute \"lid\"",
    "<img> lacks \"alt\" attribute",
];

/// [`HtmlNormalizer`] backed by the HTML Tidy command-line tool.
#[derive(Debug, Clone)]
pub struct TidyNormalizer {
    command: PathBuf,
    args: Vec<String>,
}

impl TidyNormalizer {
    /// Locate the tidy binary and build a normalizer with the default flags.
    pub fn new() -> Result<Self, EnmlError> {
        Ok(Self::with_command(resolve_tidy_binary()?, default_args()))
    }

    /// Use an explicit binary and argument list (from configuration).
    pub fn with_command(command: impl Into<PathBuf>, args: Vec<String>) -> Self {
        TidyNormalizer {
            command: command.into(),
            args,
        }
    }

    /// Replace the argument list, keeping the resolved binary.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

fn default_args() -> Vec<String> {
    ["-raw", "-asxhtml", "-q", "-utf8"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl HtmlNormalizer for TidyNormalizer {
    fn normalize(&self, input: &[u8]) -> Result<Vec<u8>, EnmlError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                EnmlError::Normalization(format!(
                    "failed to launch {} ({e})",
                    self.command.display()
                ))
            })?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                EnmlError::Normalization("could not open tidy input channel".to_string())
            })?;
            stdin
                .write_all(input)
                .map_err(|e| EnmlError::Normalization(format!("failed to feed tidy: {e}")))?;
            // Dropping stdin closes the write channel so tidy can finish.
        }

        let output = child
            .wait_with_output()
            .map_err(|e| EnmlError::Normalization(format!("tidy did not complete: {e}")))?;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            let line = line.trim();
            if line.is_empty() || BENIGN_DIAGNOSTICS.iter().any(|b| line.contains(b)) {
                continue;
            }
            debug!("tidy: {line}");
        }

        Ok(output.stdout)
    }
}

/// Resolve the tidy binary: `QUILL_TIDY_BIN` override, then the search path,
/// then well-known install locations.
fn resolve_tidy_binary() -> Result<PathBuf, EnmlError> {
    if let Some(path) = env::var_os("QUILL_TIDY_BIN") {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    if let Ok(path) = which("tidy") {
        return Ok(path);
    }

    for candidate in ["/usr/bin/tidy", "/usr/local/bin/tidy", "/opt/homebrew/bin/tidy"] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(EnmlError::Normalization(
        "Unable to locate the tidy binary. Set QUILL_TIDY_BIN to override the detection."
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benign_diagnostics_cover_editor_attributes() {
        for attr in ["type", "hash", "en-tag", "lid"] {
            let line = format!("line 1 column 1 - Warning: <img> proprietary attribute \"{attr}\"");
            assert!(
                BENIGN_DIAGNOSTICS.iter().any(|b| line.contains(b)),
                "{attr} warning should be suppressed"
            );
        }
    }

    #[test]
    fn with_command_keeps_explicit_settings() {
        let n = TidyNormalizer::with_command("/opt/tidy", vec!["-q".to_string()]);
        assert_eq!(n.command, PathBuf::from("/opt/tidy"));
        assert_eq!(n.args, vec!["-q".to_string()]);
    }
}
