//! Resolves configured locations into absolute filesystem paths.
//!
//! Resolution happens once at startup. The resulting [`ResolvedPaths`] is
//! passed by reference to the editor and the sudoers updater so neither needs
//! to consult `$HOME` or the temporary directory itself.

use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::Config;
use crate::defaults::{DEFAULT_SHELL_RC_NAME, default_lock_path, default_staging_dir};

/// Canonical locations used by a single `rcwarden` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    sudoers_path: PathBuf,
    shell_rc_path: PathBuf,
    staging_dir: PathBuf,
    lock_path: PathBuf,
}

impl ResolvedPaths {
    /// Derives absolute paths from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingHome`] when no shell resource file is
    /// configured and the home directory is unknown, and
    /// [`ResolveError::RelativePath`] when any configured path is relative.
    pub fn from_config(config: &Config) -> Result<Self, ResolveError> {
        let sudoers_path = require_absolute("sudoers_path", config.sudoers_path())?;
        let shell_rc_path = match config.shell_rc_path.as_deref() {
            Some(path) => require_absolute("shell_rc_path", path)?,
            None => dirs::home_dir()
                .ok_or(ResolveError::MissingHome)?
                .join(DEFAULT_SHELL_RC_NAME),
        };
        let staging_dir = match config.staging_dir.as_deref() {
            Some(path) => require_absolute("staging_dir", path)?,
            None => default_staging_dir().into_std_path_buf(),
        };
        let lock_path = match config.lock_path.as_deref() {
            Some(path) => require_absolute("lock_path", path)?,
            None => default_lock_path().into_std_path_buf(),
        };
        Ok(Self {
            sudoers_path,
            shell_rc_path,
            staging_dir,
            lock_path,
        })
    }

    /// Live privilege-rule file.
    #[must_use]
    pub fn sudoers_path(&self) -> &Path {
        &self.sudoers_path
    }

    /// Shell resource file holding alias and export lines.
    #[must_use]
    pub fn shell_rc_path(&self) -> &Path {
        &self.shell_rc_path
    }

    /// Directory receiving per-invocation staging directories.
    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Lock file serialising sudoers updates.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

fn require_absolute(field: &'static str, path: &Utf8Path) -> Result<PathBuf, ResolveError> {
    if path.is_absolute() {
        Ok(path.as_std_path().to_path_buf())
    } else {
        Err(ResolveError::RelativePath {
            field,
            path: path.to_path_buf(),
        })
    }
}

/// Errors raised while resolving configured paths.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The home directory could not be determined.
    #[error("cannot locate the home directory; set shell_rc_path explicitly")]
    MissingHome,
    /// A configured path was not absolute.
    #[error("{field} must be an absolute path, got '{path}'")]
    RelativePath {
        field: &'static str,
        path: Utf8PathBuf,
    },
}
