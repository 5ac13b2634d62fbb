//! Exclusive advisory lock serialising sudoers updates.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::SudoersError;

const LOCK_TARGET: &str = "rcwarden_sudoers::lock";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Held for the whole snapshot-to-commit sequence.
///
/// The lock is released when the guard is dropped. The lock file itself is
/// never removed, so a waiter can never end up holding a lock on an unlinked
/// inode while a newcomer locks a fresh file at the same path.
#[derive(Debug)]
pub struct UpdateLock {
    path: PathBuf,
    _file: File,
}

impl UpdateLock {
    /// Acquires the lock at `path`, waiting up to `timeout` for a concurrent
    /// holder to finish.
    ///
    /// # Errors
    ///
    /// Returns [`SudoersError::Lock`] when the lock file cannot be opened and
    /// [`SudoersError::LockTimeout`] when the lock stays contended.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, SudoersError> {
        let file = open_lock_file(path).map_err(|source| SudoersError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        let start = Instant::now();
        loop {
            match try_flock_exclusive(&file) {
                Ok(true) => {
                    debug!(
                        target: LOCK_TARGET,
                        path = %path.display(),
                        waited_ms = start.elapsed().as_millis(),
                        "update lock acquired"
                    );
                    return Ok(Self {
                        path: path.to_path_buf(),
                        _file: file,
                    });
                }
                Ok(false) => {
                    if start.elapsed() >= timeout {
                        return Err(SudoersError::LockTimeout {
                            path: path.to_path_buf(),
                            waited_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    return Err(SudoersError::Lock {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }
    }

    /// Location of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UpdateLock {
    fn drop(&mut self) {
        debug!(target: LOCK_TARGET, path = %self.path.display(), "update lock released");
    }
}

/// Opens or creates the lock file. A lock file created by another user may
/// be read-only for us, which is still enough to hold an advisory lock.
fn open_lock_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    match options.open(path) {
        Ok(file) => Ok(file),
        Err(error) if error.kind() == io::ErrorKind::PermissionDenied => File::open(path),
        Err(error) => Err(error),
    }
}

/// Tries to take an exclusive flock without blocking.
///
/// Returns `Ok(false)` when another open file description holds the lock.
#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    // SAFETY: `fd` is a valid descriptor owned by `file` for the duration of
    // the call.
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }
    let error = io::Error::last_os_error();
    if error.kind() == io::ErrorKind::WouldBlock {
        return Ok(false);
    }
    Err(error)
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File) -> io::Result<bool> {
    Ok(true)
}
