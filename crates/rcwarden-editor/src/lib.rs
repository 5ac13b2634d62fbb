//! Line-level editing of a user's shell resource file.
//!
//! The editor appends `alias` and `export` definitions and removes them again
//! by literal prefix. It never interprets shell syntax: the command or value
//! text is written verbatim and correctness is the caller's concern.
//!
//! Appends are duplicate-tolerant. Shells source the file top to bottom, so
//! a later definition shadows an earlier one. Removal drops every line whose
//! trimmed text starts with the entry prefix and rewrites the file through a
//! temporary sibling that is renamed into place, so an interrupted rewrite
//! never leaves a truncated resource file behind.
//!
//! ```rust,no_run
//! use rcwarden_editor::ShellResourceFile;
//!
//! # fn main() -> Result<(), rcwarden_editor::EditorError> {
//! let rc = ShellResourceFile::new("/home/ops/.bashrc");
//! rc.add_alias("ll", "ls -l")?;
//! let removed = rc.remove_alias("ll")?;
//! assert_eq!(removed, 1);
//! # Ok(()) }
//! ```

mod entry;
mod error;
mod resource_file;

pub use entry::ShellEntry;
pub use error::EditorError;
pub use resource_file::ShellResourceFile;

/// Tracing target for resource file edits.
pub(crate) const EDITOR_TARGET: &str = "rcwarden_editor";

#[cfg(test)]
mod tests;
