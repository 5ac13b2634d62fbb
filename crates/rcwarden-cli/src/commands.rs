//! Executes parsed commands against the editor and the sudoers updater.

use std::io::Write;

use rcwarden_config::{Config, ResolvedPaths};
use rcwarden_editor::ShellResourceFile;
use rcwarden_sudoers::{
    CandidateEntry, PrivilegedOps, StagingRetention, SudoersUpdater, SystemPrivilegedOps,
    UpdateOutcome, UpdaterSettings,
};
use tracing::debug;

use crate::AppError;
use crate::cli::{AliasAction, CliCommand, ExportAction, SudoersAction};

const CLI_TARGET: &str = "rcwarden_cli";

pub(crate) const REJECTED_MESSAGE: &str = "Error: sudoers entry invalid. No changes were made.";

/// How a successfully executed command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandStatus {
    Completed,
    Rejected,
}

/// Everything a command needs, resolved once at startup.
pub(crate) struct CommandContext<'a> {
    pub(crate) config: &'a Config,
    pub(crate) paths: &'a ResolvedPaths,
    pub(crate) privileged: Option<&'a dyn PrivilegedOps>,
}

pub(crate) fn execute<W, E>(
    command: CliCommand,
    context: &CommandContext<'_>,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<CommandStatus, AppError>
where
    W: Write,
    E: Write,
{
    match command {
        CliCommand::Alias { action } => {
            execute_alias(action, context, stdout).map(|()| CommandStatus::Completed)
        }
        CliCommand::Export { action } => {
            execute_export(action, context, stdout).map(|()| CommandStatus::Completed)
        }
        CliCommand::Sudoers { action } => execute_sudoers(action, context, stdout, stderr),
    }
}

fn resource_file(context: &CommandContext<'_>) -> ShellResourceFile {
    ShellResourceFile::new(context.paths.shell_rc_path())
}

fn execute_alias<W: Write>(
    action: AliasAction,
    context: &CommandContext<'_>,
    stdout: &mut W,
) -> Result<(), AppError> {
    let file = resource_file(context);
    match action {
        AliasAction::Add { name, command } => {
            let line = file.add_alias(&name, &command)?;
            writeln!(stdout, "Alias added: {line}")?;
        }
        AliasAction::Remove { name } => {
            let removed = file.remove_alias(&name)?;
            debug!(target: CLI_TARGET, name = %name, removed, "alias removal finished");
            writeln!(stdout, "Alias removed: {name}")?;
        }
    }
    Ok(())
}

fn execute_export<W: Write>(
    action: ExportAction,
    context: &CommandContext<'_>,
    stdout: &mut W,
) -> Result<(), AppError> {
    let file = resource_file(context);
    match action {
        ExportAction::Add { variable, value } => {
            let line = file.add_export(&variable, &value)?;
            writeln!(stdout, "Export added: {line}")?;
        }
        ExportAction::Remove { variable } => {
            let removed = file.remove_export(&variable)?;
            debug!(target: CLI_TARGET, variable = %variable, removed, "export removal finished");
            writeln!(stdout, "Export removed: {variable}")?;
        }
    }
    Ok(())
}

fn execute_sudoers<W, E>(
    action: SudoersAction,
    context: &CommandContext<'_>,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<CommandStatus, AppError>
where
    W: Write,
    E: Write,
{
    let SudoersAction::Add { entry } = action;
    let settings = updater_settings(context);
    let system;
    let ops: &dyn PrivilegedOps = match context.privileged {
        Some(ops) => ops,
        None => {
            system = SystemPrivilegedOps::new(
                context.config.elevation(),
                context.config.validator_program(),
                context.config.command_timeout(),
            );
            &system
        }
    };

    let outcome = SudoersUpdater::new(&settings, ops).add_entry(&CandidateEntry::new(entry))?;
    match outcome {
        UpdateOutcome::Committed => {
            writeln!(stdout, "Sudoers updated successfully.")?;
            Ok(CommandStatus::Completed)
        }
        UpdateOutcome::Rejected { diagnostics } => {
            writeln!(stderr, "{REJECTED_MESSAGE}")?;
            if !diagnostics.is_empty() {
                writeln!(stderr, "{diagnostics}")?;
            }
            Ok(CommandStatus::Rejected)
        }
    }
}

fn updater_settings(context: &CommandContext<'_>) -> UpdaterSettings {
    let retention = if context.config.retain_staging() {
        StagingRetention::Keep
    } else {
        StagingRetention::Remove
    };
    UpdaterSettings::new(
        context.paths.sudoers_path(),
        context.paths.staging_dir(),
        context.paths.lock_path(),
    )
    .with_lock_timeout(context.config.lock_timeout())
    .with_retention(retention)
}
