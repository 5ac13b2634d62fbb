//! Command-line argument definitions for `rcwarden`.

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};

/// Safely edit shell aliases, exports, and sudoers entries.
///
/// Global configuration flags such as `--config-path` or `--sudoers-path`
/// must precede the command group.
#[derive(Parser, Debug)]
#[command(
    name = "rcwarden",
    version,
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// The configuration area to edit.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Command groups.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Manages alias lines in the shell resource file.
    #[command(arg_required_else_help = true)]
    Alias {
        /// The alias action to perform.
        #[command(subcommand)]
        action: AliasAction,
    },
    /// Manages export lines in the shell resource file.
    #[command(arg_required_else_help = true)]
    Export {
        /// The export action to perform.
        #[command(subcommand)]
        action: ExportAction,
    },
    /// Adds validated entries to the sudoers file.
    #[command(arg_required_else_help = true)]
    Sudoers {
        /// The sudoers action to perform.
        #[command(subcommand)]
        action: SudoersAction,
    },
}

/// Alias actions.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum AliasAction {
    /// Appends `alias NAME='COMMAND'`.
    Add {
        /// Alias name.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        name: String,
        /// Command the alias expands to.
        #[arg(value_parser = NonEmptyStringValueParser::new(), allow_hyphen_values = true)]
        command: String,
    },
    /// Removes every `alias NAME=` line.
    Remove {
        /// Alias name.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        name: String,
    },
}

/// Export actions.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ExportAction {
    /// Appends `export VARIABLE=VALUE`.
    Add {
        /// Variable name.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        variable: String,
        /// Value assigned to the variable.
        #[arg(value_parser = NonEmptyStringValueParser::new(), allow_hyphen_values = true)]
        value: String,
    },
    /// Removes every `export VARIABLE=` line.
    Remove {
        /// Variable name.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        variable: String,
    },
}

/// Sudoers actions.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum SudoersAction {
    /// Validates ENTRY against a staging copy and commits it if accepted.
    Add {
        /// The sudoers line to add.
        #[arg(value_parser = NonEmptyStringValueParser::new(), allow_hyphen_values = true)]
        entry: String,
    },
}
