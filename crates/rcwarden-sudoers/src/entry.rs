//! Candidate privilege rules supplied by the caller.

use std::fmt;

/// A single proposed sudoers line, untrusted until validated.
///
/// The text is kept verbatim: it is neither escaped, deduplicated, nor
/// checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry(String);

impl CandidateEntry {
    /// Wraps the caller-supplied entry text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The entry exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bytes appended to the staging copy: a blank line, the entry, and a
    /// terminating newline.
    #[must_use]
    pub fn staged_text(&self) -> String {
        format!("\n{}\n", self.0)
    }
}

impl fmt::Display for CandidateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CandidateEntry {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for CandidateEntry {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}
