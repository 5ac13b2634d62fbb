use std::env;

use camino::Utf8PathBuf;

/// Live privilege-rule file edited by `sudoers add`.
pub const DEFAULT_SUDOERS_PATH: &str = "/etc/sudoers";

/// Validator used to check staged privilege rules.
pub const DEFAULT_VALIDATOR_PROGRAM: &str = "visudo";

/// Program prefixed to privileged commands.
pub const DEFAULT_ELEVATION_PROGRAM: &str = "sudo";

/// Shell resource file name resolved under the home directory.
pub const DEFAULT_SHELL_RC_NAME: &str = ".bashrc";

/// Name of the machine-wide lock file serialising sudoers updates.
pub const DEFAULT_LOCK_FILE_NAME: &str = "rcwarden-sudoers.lock";

/// Upper bound, in seconds, on any single external process.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Upper bound, in seconds, on waiting for the update lock.
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 10;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binary.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

pub(crate) fn default_sudoers_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SUDOERS_PATH)
}

pub(crate) fn default_validator_program() -> String {
    DEFAULT_VALIDATOR_PROGRAM.to_owned()
}

pub(crate) fn default_elevation_program() -> String {
    DEFAULT_ELEVATION_PROGRAM.to_owned()
}

pub(crate) const fn default_elevate() -> crate::Switch {
    crate::Switch::ON
}

pub(crate) const fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

pub(crate) const fn default_lock_timeout_secs() -> u64 {
    DEFAULT_LOCK_TIMEOUT_SECS
}

/// Directory that receives per-invocation staging directories when none is
/// configured.
pub fn default_staging_dir() -> Utf8PathBuf {
    let candidate = env::temp_dir();
    Utf8PathBuf::from_path_buf(candidate).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

/// Lock file shared by every invocation on the machine when none is
/// configured.
pub fn default_lock_path() -> Utf8PathBuf {
    default_staging_dir().join(DEFAULT_LOCK_FILE_NAME)
}
