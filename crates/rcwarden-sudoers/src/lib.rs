//! Validated, staged updates of the live sudoers file.
//!
//! A corrupt sudoers file can lock every user out of administrative access,
//! so the live file is only ever replaced by a copy that the external
//! validator has accepted in the same attempt:
//!
//! 1. **Snapshot**: the live file is copied, with elevated privileges, into a
//!    staging copy unique to this invocation.
//! 2. **Stage**: the candidate entry is appended to the staging copy,
//!    preceded by a blank line.
//! 3. **Validate**: the validator checks the staging copy only.
//! 4. **Commit or abort**: an accepted copy is atomically copied over the
//!    live file; a rejected one is discarded and reported as a normal
//!    [`UpdateOutcome::Rejected`].
//!
//! The whole sequence runs under an exclusive [`UpdateLock`] so concurrent
//! invocations can neither clobber each other's staging copies nor lose each
//! other's committed entries. Privileged work goes through the
//! [`PrivilegedOps`] capability: [`SystemPrivilegedOps`] spawns real
//! processes, while tests substitute a scripted double.
//!
//! Rule grammar is never interpreted here; the validator's exit status is the
//! only acceptance criterion.

mod entry;
mod error;
mod lock;
mod outcome;
mod privileged;
mod process;
mod staging;
mod updater;

#[cfg(any(test, feature = "test-support"))]
mod test_doubles;

pub use entry::CandidateEntry;
pub use error::{PrivilegeError, SudoersError};
pub use lock::UpdateLock;
pub use outcome::{UpdateOutcome, ValidationVerdict};
pub use privileged::{LIVE_FILE_MODE, Ownership, PrivilegedOps};
pub use process::SystemPrivilegedOps;
pub use staging::{StagingCopy, StagingRetention};
pub use updater::{SudoersUpdater, UpdaterSettings};

#[cfg(any(test, feature = "test-support"))]
pub use test_doubles::{FakePrivilegedOps, RecordedCall};
