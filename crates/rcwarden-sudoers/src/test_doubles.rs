//! Scripted [`PrivilegedOps`] double for tests and behavioural specs.
//!
//! Copies are performed with ordinary file I/O, so the updater's sequencing
//! can be exercised against real temporary files without elevation.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::error::PrivilegeError;
use crate::outcome::ValidationVerdict;
use crate::privileged::{Ownership, PrivilegedOps};

const FAKE_COPY: &str = "fake-install";
const FAKE_VALIDATOR: &str = "fake-visudo";

/// One call observed by [`FakePrivilegedOps`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// A privileged copy.
    Copy {
        /// Copy source.
        source: PathBuf,
        /// Copy destination.
        destination: PathBuf,
        /// Ownership requested for the destination.
        ownership: Ownership,
    },
    /// A validator run.
    Validate {
        /// File handed to the validator.
        path: PathBuf,
    },
}

#[derive(Debug, Clone)]
enum Verdicts {
    AcceptAll,
    RejectAll(String),
    RejectContaining(String),
}

/// Configurable privileged capability.
#[derive(Debug)]
pub struct FakePrivilegedOps {
    verdicts: Verdicts,
    fail_snapshot: bool,
    fail_commit: bool,
    validator_timeout: bool,
    validation_delay: Duration,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakePrivilegedOps {
    const fn with_verdicts(verdicts: Verdicts) -> Self {
        Self {
            verdicts,
            fail_snapshot: false,
            fail_commit: false,
            validator_timeout: false,
            validation_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Accepts every staging copy.
    #[must_use]
    pub const fn accepting() -> Self {
        Self::with_verdicts(Verdicts::AcceptAll)
    }

    /// Rejects every staging copy with the given diagnostics.
    #[must_use]
    pub fn rejecting(diagnostics: impl Into<String>) -> Self {
        Self::with_verdicts(Verdicts::RejectAll(diagnostics.into()))
    }

    /// Rejects staging copies whose content contains `marker`.
    #[must_use]
    pub fn rejecting_entries_containing(marker: impl Into<String>) -> Self {
        Self::with_verdicts(Verdicts::RejectContaining(marker.into()))
    }

    /// Makes snapshot copies (into the invoker-owned staging copy) fail.
    #[must_use]
    pub const fn failing_snapshot(mut self) -> Self {
        self.fail_snapshot = true;
        self
    }

    /// Makes commit copies (over the live file) fail.
    #[must_use]
    pub const fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Makes the validator report a timeout.
    #[must_use]
    pub const fn timing_out_validator(mut self) -> Self {
        self.validator_timeout = true;
        self
    }

    /// Sleeps inside every validation, widening race windows in tests.
    #[must_use]
    pub const fn with_validation_delay(mut self, delay: Duration) -> Self {
        self.validation_delay = delay;
        self
    }

    /// Every call observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.journal().clone()
    }

    /// Returns true when a copy towards root ownership was requested.
    #[must_use]
    pub fn commit_attempted(&self) -> bool {
        self.journal().iter().any(|call| {
            matches!(
                call,
                RecordedCall::Copy {
                    ownership: Ownership::System { .. },
                    ..
                }
            )
        })
    }

    fn journal(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: RecordedCall) {
        self.journal().push(call);
    }
}

impl PrivilegedOps for FakePrivilegedOps {
    fn copy(
        &self,
        source: &Path,
        destination: &Path,
        ownership: Ownership,
    ) -> Result<(), PrivilegeError> {
        self.record(RecordedCall::Copy {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            ownership,
        });
        let injected = match ownership {
            Ownership::Invoker => self.fail_snapshot,
            Ownership::System { .. } => self.fail_commit,
        };
        if injected {
            return Err(PrivilegeError::NonZeroExit {
                program: String::from(FAKE_COPY),
                status: 1,
                stderr: String::from("injected copy failure"),
            });
        }
        atomic_copy(source, destination).map_err(|error| PrivilegeError::Io {
            program: String::from(FAKE_COPY),
            source: error,
        })
    }

    fn validate(&self, path: &Path) -> Result<ValidationVerdict, PrivilegeError> {
        self.record(RecordedCall::Validate {
            path: path.to_path_buf(),
        });
        if !self.validation_delay.is_zero() {
            thread::sleep(self.validation_delay);
        }
        if self.validator_timeout {
            return Err(PrivilegeError::Timeout {
                program: String::from(FAKE_VALIDATOR),
                timeout: Duration::ZERO,
            });
        }
        let verdict = match &self.verdicts {
            Verdicts::AcceptAll => ValidationVerdict::from_exit(true, "parsed OK"),
            Verdicts::RejectAll(diagnostics) => {
                ValidationVerdict::from_exit(false, diagnostics.clone())
            }
            Verdicts::RejectContaining(marker) => {
                let content = fs::read_to_string(path).map_err(|error| PrivilegeError::Io {
                    program: String::from(FAKE_VALIDATOR),
                    source: error,
                })?;
                if content.contains(marker.as_str()) {
                    ValidationVerdict::from_exit(false, format!("syntax error near '{marker}'"))
                } else {
                    ValidationVerdict::from_exit(true, "parsed OK")
                }
            }
        };
        Ok(verdict)
    }
}

fn atomic_copy(source: &Path, destination: &Path) -> io::Result<()> {
    let bytes = fs::read(source)?;
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(&bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(destination).map_err(|error| error.error)?;
    Ok(())
}
