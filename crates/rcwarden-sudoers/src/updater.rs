//! Orchestration of the snapshot, stage, validate, commit sequence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::entry::CandidateEntry;
use crate::error::SudoersError;
use crate::lock::UpdateLock;
use crate::outcome::{UpdateOutcome, ValidationVerdict};
use crate::privileged::{Ownership, PrivilegedOps};
use crate::staging::{StagingCopy, StagingRetention};

/// Tracing target for the update protocol.
const UPDATER_TARGET: &str = "rcwarden_sudoers::updater";

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved locations and policies for one updater.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterSettings {
    live_path: PathBuf,
    staging_root: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
    retention: StagingRetention,
}

impl UpdaterSettings {
    /// Settings with a ten second lock budget and staging cleanup enabled.
    #[must_use]
    pub fn new(
        live_path: impl Into<PathBuf>,
        staging_root: impl Into<PathBuf>,
        lock_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            live_path: live_path.into(),
            staging_root: staging_root.into(),
            lock_path: lock_path.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            retention: StagingRetention::Remove,
        }
    }

    /// Overrides how long to wait for a concurrent update.
    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Overrides what happens to staging directories after each attempt.
    #[must_use]
    pub const fn with_retention(mut self, retention: StagingRetention) -> Self {
        self.retention = retention;
        self
    }

    /// The live sudoers file.
    #[must_use]
    pub fn live_path(&self) -> &Path {
        &self.live_path
    }

    /// Directory under which staging directories are created.
    #[must_use]
    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// The update lock file.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

/// Applies candidate entries to the live sudoers file.
pub struct SudoersUpdater<'a> {
    settings: &'a UpdaterSettings,
    ops: &'a dyn PrivilegedOps,
}

impl<'a> SudoersUpdater<'a> {
    /// Builds an updater over the given settings and privileged capability.
    #[must_use]
    pub const fn new(settings: &'a UpdaterSettings, ops: &'a dyn PrivilegedOps) -> Self {
        Self { settings, ops }
    }

    /// Appends `entry` to the live file if the validator accepts it.
    ///
    /// A rejection is returned as [`UpdateOutcome::Rejected`] and leaves the
    /// live file byte-identical. The live file is only written by the commit
    /// copy, which is reachable solely from an accepted verdict produced for
    /// this attempt's staging copy.
    ///
    /// # Errors
    ///
    /// Returns [`SudoersError`] when the lock, snapshot, staging, validator,
    /// or commit step fails. None of these leave the live file modified.
    pub fn add_entry(&self, entry: &CandidateEntry) -> Result<UpdateOutcome, SudoersError> {
        let live = self.settings.live_path();
        let _lock = UpdateLock::acquire(self.settings.lock_path(), self.settings.lock_timeout)?;
        let staging = StagingCopy::create(self.settings.staging_root(), self.settings.retention)?;

        self.ops
            .copy(live, staging.path(), Ownership::Invoker)
            .map_err(|source| {
                warn!(target: UPDATER_TARGET, live = %live.display(), error = %source, "snapshot failed");
                SudoersError::Snapshot {
                    live: live.to_path_buf(),
                    source,
                }
            })?;
        debug!(target: UPDATER_TARGET, staging = %staging.path().display(), "snapshot taken");

        staging.append_entry(entry)?;
        debug!(target: UPDATER_TARGET, entry = %entry, "candidate entry staged");

        let verdict = self
            .ops
            .validate(staging.path())
            .map_err(|source| {
                warn!(target: UPDATER_TARGET, error = %source, "validator failed to run");
                SudoersError::Validator { source }
            })?;

        match verdict {
            ValidationVerdict::Accepted { .. } => {
                self.ops
                    .copy(staging.path(), live, Ownership::LIVE)
                    .map_err(|source| {
                        warn!(target: UPDATER_TARGET, live = %live.display(), error = %source, "commit failed");
                        SudoersError::Commit {
                            live: live.to_path_buf(),
                            source,
                        }
                    })?;
                info!(target: UPDATER_TARGET, live = %live.display(), "validated entry committed");
                Ok(UpdateOutcome::Committed)
            }
            ValidationVerdict::Rejected { diagnostics } => {
                info!(target: UPDATER_TARGET, live = %live.display(), "validator rejected entry; live file untouched");
                Ok(UpdateOutcome::Rejected { diagnostics })
            }
        }
    }
}
