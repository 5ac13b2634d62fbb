//! Errors raised while editing a shell resource file.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// I/O failures surfaced to the caller without retry.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The resource file could not be created.
    #[error("failed to create {path}: {source}")]
    Create {
        /// Resource file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The existing resource file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Resource file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The resource file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Resource file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing new content failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Resource file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Renaming the rewritten file into place failed.
    #[error("failed to replace {path}: {source}")]
    Persist {
        /// Resource file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl EditorError {
    /// Path of the resource file involved in the failure.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Create { path, .. }
            | Self::Open { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Persist { path, .. } => path,
        }
    }
}
