//! Capability seam for privileged work.
//!
//! The updater never spawns processes itself. It asks a [`PrivilegedOps`]
//! implementation to copy files and to validate a staging copy, which lets
//! the sequencing logic run in tests without elevated privileges.

use std::path::Path;

use crate::error::PrivilegeError;
use crate::outcome::ValidationVerdict;

/// Permission bits given to the live sudoers file on commit.
pub const LIVE_FILE_MODE: u32 = 0o440;

/// Permission bits given to staging snapshots.
pub(crate) const STAGING_FILE_MODE: u32 = 0o600;

/// Ownership applied to the destination of a privileged copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Owned by the invoking user, mode `0600`. Used for staging snapshots so
    /// the entry can be appended without further elevation.
    Invoker,
    /// Owned by root with the given mode. Used when committing.
    System {
        /// Permission bits of the committed file.
        mode: u32,
    },
}

impl Ownership {
    /// Ownership of the committed live file.
    pub const LIVE: Self = Self::System {
        mode: LIVE_FILE_MODE,
    };

    /// Permission bits applied to the destination.
    #[must_use]
    pub const fn mode(self) -> u32 {
        match self {
            Self::Invoker => STAGING_FILE_MODE,
            Self::System { mode } => mode,
        }
    }

    /// Numeric owner and group applied to the destination.
    #[must_use]
    pub fn owner_ids(self) -> (u32, u32) {
        match self {
            Self::Invoker => invoker_ids(),
            Self::System { .. } => (0, 0),
        }
    }
}

#[cfg(unix)]
fn invoker_ids() -> (u32, u32) {
    // SAFETY: geteuid and getegid cannot fail and touch no memory.
    unsafe { (libc::geteuid(), libc::getegid()) }
}

#[cfg(not(unix))]
fn invoker_ids() -> (u32, u32) {
    (0, 0)
}

/// Privileged operations consumed by the sudoers updater.
pub trait PrivilegedOps {
    /// Copies `source` over `destination` with elevated privileges.
    ///
    /// Implementations must be atomic from the caller's perspective: either
    /// the destination holds the full new content or it is unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`PrivilegeError`] when the copy could not be completed.
    fn copy(
        &self,
        source: &Path,
        destination: &Path,
        ownership: Ownership,
    ) -> Result<(), PrivilegeError>;

    /// Runs the validator against `path` without modifying it.
    ///
    /// A rejection is a successful call returning
    /// [`ValidationVerdict::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns a [`PrivilegeError`] when the validator could not run to
    /// completion.
    fn validate(&self, path: &Path) -> Result<ValidationVerdict, PrivilegeError>;
}
