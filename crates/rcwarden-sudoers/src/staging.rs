//! Per-invocation staging copies of the sudoers file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::entry::CandidateEntry;
use crate::error::SudoersError;

const STAGING_TARGET: &str = "rcwarden_sudoers::staging";
const STAGING_DIR_PREFIX: &str = "rcwarden-";
const STAGING_FILE_NAME: &str = "sudoers";

/// What happens to the staging directory once the attempt finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StagingRetention {
    /// Delete the staging directory when the attempt ends.
    #[default]
    Remove,
    /// Leave the staging directory in place for inspection.
    Keep,
}

/// A staging copy living in its own freshly created directory.
///
/// Each attempt gets a distinct directory, so two concurrent invocations
/// never write to the same staging file.
#[derive(Debug)]
pub struct StagingCopy {
    dir: Option<TempDir>,
    file: PathBuf,
    retention: StagingRetention,
}

impl StagingCopy {
    /// Creates an empty staging directory under `root`.
    ///
    /// The staging file itself is not created; the snapshot copy does that.
    ///
    /// # Errors
    ///
    /// Returns [`SudoersError::Staging`] when the directory cannot be
    /// created.
    pub fn create(root: &Path, retention: StagingRetention) -> Result<Self, SudoersError> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_DIR_PREFIX)
            .tempdir_in(root)
            .map_err(|source| SudoersError::staging(root, source))?;
        let file = dir.path().join(STAGING_FILE_NAME);
        debug!(target: STAGING_TARGET, path = %file.display(), "staging directory created");
        Ok(Self {
            dir: Some(dir),
            file,
            retention,
        })
    }

    /// Path of the staging file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Appends the entry, preceded by a blank line, and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`SudoersError::Staging`] when the staging file cannot be
    /// opened or written.
    pub fn append_entry(&self, entry: &CandidateEntry) -> Result<(), SudoersError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.file)
            .map_err(|source| SudoersError::staging(&self.file, source))?;
        file.write_all(entry.staged_text().as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|source| SudoersError::staging(&self.file, source))
    }
}

impl Drop for StagingCopy {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match self.retention {
            StagingRetention::Keep => {
                let kept = dir.keep();
                info!(
                    target: STAGING_TARGET,
                    path = %kept.display(),
                    "staging directory retained"
                );
            }
            StagingRetention::Remove => {
                let path = dir.path().to_path_buf();
                if let Err(error) = dir.close() {
                    warn!(
                        target: STAGING_TARGET,
                        path = %path.display(),
                        %error,
                        "failed to remove staging directory"
                    );
                }
            }
        }
    }
}
