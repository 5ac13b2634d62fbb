//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use rcwarden_config::ResolveError;
use rcwarden_editor::EditorError;
use rcwarden_sudoers::SudoersError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid configuration: {0}")]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("sudoers update aborted: {0}")]
    Sudoers(#[from] SudoersError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
