//! Command-line runtime for `rcwarden`.
//!
//! The runtime parses the command, loads layered configuration, installs
//! telemetry, resolves paths once, and dispatches to the shell resource
//! editor or the sudoers updater. Streams, the configuration loader, and the
//! privileged capability can all be substituted in tests.
//!
//! Exit codes: `0` on success, `1` on fatal errors, `2` on usage errors, and
//! `3` when the validator rejects a sudoers entry.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;
use rcwarden_sudoers::PrivilegedOps;

mod cli;
mod commands;
mod config;
mod errors;
mod telemetry;

use cli::Cli;
use commands::{CommandContext, CommandStatus};
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;

/// Exit status reported when the validator rejected a sudoers entry.
const EXIT_REJECTED: u8 = 3;

/// Bundles the output streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    privileged: Option<&'a dyn PrivilegedOps>,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self {
            io,
            loader,
            privileged: None,
        }
    }

    #[cfg(test)]
    fn with_privileged_ops(mut self, privileged: &'a dyn PrivilegedOps) -> Self {
        self.privileged = Some(privileged);
        self
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let result = Cli::try_parse_from(split.command_arguments)
            .map_err(AppError::CliUsage)
            .and_then(|cli| {
                let config = self.loader.load(&split.config_arguments)?;
                telemetry::initialise(&config)?;
                let paths = config.resolve()?;
                let context = CommandContext {
                    config: &config,
                    paths: &paths,
                    privileged: self.privileged,
                };
                commands::execute(
                    cli.command,
                    &context,
                    &mut *self.io.stdout,
                    &mut *self.io.stderr,
                )
            });

        match result {
            Ok(CommandStatus::Completed) => ExitCode::SUCCESS,
            Ok(CommandStatus::Rejected) => ExitCode::from(EXIT_REJECTED),
            Err(AppError::CliUsage(error)) => self.report_usage(&error),
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    /// Prints clap's rendering of help, version, or usage errors.
    ///
    /// Explicit `--help` and `--version` go to stdout and succeed; anything
    /// else, including help shown for a missing command, goes to stderr
    /// together with the usage line.
    fn report_usage(&mut self, error: &clap::Error) -> ExitCode {
        let code = u8::try_from(error.exit_code()).unwrap_or(1);
        match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = write!(self.io.stdout, "{error}");
            }
            _ => {
                let rendered = error.to_string();
                let _ = write!(self.io.stderr, "{rendered}");
                // Some kinds, such as an empty positional, omit the usage.
                if !rendered.contains("Usage:") {
                    let usage = Cli::command().render_usage();
                    let _ = writeln!(self.io.stderr, "\n{usage}");
                }
            }
        }
        ExitCode::from(code)
    }
}

/// Runs the CLI using the provided arguments and output streams.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

/// Runs the CLI with a custom loader and a scripted privileged capability.
#[cfg(test)]
pub(crate) fn run_with_privileged_ops<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    privileged: &'a dyn PrivilegedOps,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader)
        .with_privileged_ops(privileged)
        .run(args)
}

#[cfg(test)]
mod tests;
