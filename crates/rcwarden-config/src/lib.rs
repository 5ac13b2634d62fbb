//! Shared configuration for the `rcwarden` tool.
//!
//! Configuration is layered by `ortho_config`: serde defaults, a TOML file
//! (`--config-path` or `RCWARDEN_CONFIG_PATH`), `RCWARDEN_*` environment
//! variables, and finally command-line flags. The loaded [`Config`] is turned
//! into [`ResolvedPaths`] once at startup so no deeper code looks up the home
//! directory or the system temporary directory on its own.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod paths;
mod switch;

pub use defaults::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_ELEVATION_PROGRAM, DEFAULT_LOCK_FILE_NAME,
    DEFAULT_LOCK_TIMEOUT_SECS, DEFAULT_LOG_FILTER, DEFAULT_SHELL_RC_NAME, DEFAULT_SUDOERS_PATH,
    DEFAULT_VALIDATOR_PROGRAM, default_lock_path, default_log_filter, default_log_filter_string,
    default_log_format, default_staging_dir,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use paths::{ResolveError, ResolvedPaths};
pub use switch::Switch;

/// Runtime configuration for every `rcwarden` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RCWARDEN")]
pub struct Config {
    /// Live privilege-rule file.
    #[serde(default = "defaults::default_sudoers_path")]
    pub sudoers_path: Utf8PathBuf,
    /// Shell resource file holding alias and export lines.
    #[serde(default)]
    pub shell_rc_path: Option<Utf8PathBuf>,
    /// Directory receiving per-invocation staging directories.
    #[serde(default)]
    pub staging_dir: Option<Utf8PathBuf>,
    /// Lock file serialising sudoers updates across processes.
    #[serde(default)]
    pub lock_path: Option<Utf8PathBuf>,
    /// Validator invoked as `<program> -c -f <staging file>`.
    #[serde(default = "defaults::default_validator_program")]
    pub validator_program: String,
    /// Program prefixed to privileged commands.
    #[serde(default = "defaults::default_elevation_program")]
    pub elevation_program: String,
    /// Whether privileged commands run through `elevation_program`.
    #[serde(default = "defaults::default_elevate")]
    pub elevate: Switch,
    /// Upper bound, in seconds, on each external process.
    #[serde(default = "defaults::default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Upper bound, in seconds, on waiting for the update lock.
    #[serde(default = "defaults::default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
    /// Keeps staging directories on disk after an update attempt.
    #[serde(default)]
    pub retain_staging: Switch,
    /// Filter expression for the tracing subscriber.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for the tracing subscriber.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sudoers_path: defaults::default_sudoers_path(),
            shell_rc_path: None,
            staging_dir: None,
            lock_path: None,
            validator_program: defaults::default_validator_program(),
            elevation_program: defaults::default_elevation_program(),
            elevate: defaults::default_elevate(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
            retain_staging: Switch::OFF,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Live privilege-rule file.
    #[must_use]
    pub fn sudoers_path(&self) -> &Utf8Path {
        &self.sudoers_path
    }

    /// Validator program name or path.
    #[must_use]
    pub fn validator_program(&self) -> &str {
        &self.validator_program
    }

    /// Elevation program used when [`Config::elevate`] is set.
    #[must_use]
    pub fn elevation(&self) -> Option<&str> {
        self.elevate.is_on().then_some(self.elevation_program.as_str())
    }

    /// Bound applied to every external process.
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Bound applied while waiting for the update lock.
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }

    /// Whether staging directories survive the update attempt.
    #[must_use]
    pub const fn retain_staging(&self) -> bool {
        self.retain_staging.is_on()
    }

    /// Filter expression for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for the tracing subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Resolves every configured path against the current environment.
    ///
    /// This is the only place that consults the home directory or the system
    /// temporary directory.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the home directory cannot be determined
    /// or when a configured path is relative.
    pub fn resolve(&self) -> Result<ResolvedPaths, ResolveError> {
        ResolvedPaths::from_config(self)
    }
}
