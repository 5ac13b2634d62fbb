//! Error types for the sudoers safe-update protocol.
//!
//! A validator rejection is not an error: it is returned as
//! [`UpdateOutcome::Rejected`](crate::UpdateOutcome::Rejected). The enums here
//! cover operational failures that abort the attempt. Every one of them is
//! raised before the live file is replaced, or by a commit copy that leaves
//! the live file as it was.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single privileged process.
#[derive(Debug, Error)]
pub enum PrivilegeError {
    /// The process could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The process exited unsuccessfully.
    #[error("{program} exited with status {status}{}", render_stderr(stderr))]
    NonZeroExit {
        /// Program that failed.
        program: String,
        /// Exit status, or `-1` when terminated by a signal.
        status: i32,
        /// Captured standard error.
        stderr: String,
    },
    /// The process exceeded its time budget and was killed.
    #[error("{program} did not finish within {timeout:?} and was killed")]
    Timeout {
        /// Program that timed out.
        program: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },
    /// Waiting on or talking to the process failed.
    #[error("I/O error while running {program}: {source}")]
    Io {
        /// Program being supervised.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl PrivilegeError {
    /// Returns true when the process was killed for exceeding its budget.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn render_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Errors that abort a sudoers update attempt.
#[derive(Debug, Error)]
pub enum SudoersError {
    /// Copying the live file into the staging copy failed.
    #[error("failed to snapshot {live}: {source}")]
    Snapshot {
        /// Live file that was being copied.
        live: PathBuf,
        /// Failure of the privileged copy.
        #[source]
        source: PrivilegeError,
    },
    /// Replacing the live file with the accepted staging copy failed.
    #[error("failed to commit the validated copy to {live}: {source}")]
    Commit {
        /// Live file that was being replaced.
        live: PathBuf,
        /// Failure of the privileged copy.
        #[source]
        source: PrivilegeError,
    },
    /// The validator could not produce a verdict.
    #[error("validator did not produce a verdict: {source}")]
    Validator {
        /// Failure while running the validator.
        #[source]
        source: PrivilegeError,
    },
    /// The staging copy could not be created or written.
    #[error("staging copy {path} is unusable: {source}")]
    Staging {
        /// Staging location involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The update lock could not be opened or locked.
    #[error("failed to lock {path}: {source}")]
    Lock {
        /// Lock file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Another update held the lock for longer than the configured budget.
    #[error("another sudoers update is still running; gave up waiting for {path} after {waited_ms}ms")]
    LockTimeout {
        /// Lock file path.
        path: PathBuf,
        /// Milliseconds spent waiting.
        waited_ms: u64,
    },
}

impl SudoersError {
    /// Returns true when the attempt was aborted by a time budget.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        match self {
            Self::Snapshot { source, .. }
            | Self::Commit { source, .. }
            | Self::Validator { source } => source.is_timeout(),
            Self::LockTimeout { .. } => true,
            Self::Staging { .. } | Self::Lock { .. } => false,
        }
    }

    pub(crate) fn staging(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Staging {
            path: path.into(),
            source,
        }
    }
}
