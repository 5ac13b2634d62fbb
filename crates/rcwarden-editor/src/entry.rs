//! Shell definitions understood by the editor.

use std::fmt;

/// A single definition line in a shell resource file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEntry {
    /// `alias name='command'`.
    Alias {
        /// Alias name.
        name: String,
        /// Command the alias expands to, written verbatim.
        command: String,
    },
    /// `export variable=value`.
    Export {
        /// Environment variable name.
        variable: String,
        /// Value assigned to the variable, written verbatim.
        value: String,
    },
}

impl ShellEntry {
    /// Builds an alias definition.
    #[must_use]
    pub fn alias(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::Alias {
            name: name.into(),
            command: command.into(),
        }
    }

    /// Builds an environment export.
    #[must_use]
    pub fn export(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Export {
            variable: variable.into(),
            value: value.into(),
        }
    }

    /// Renders the line written to the resource file, without a newline.
    #[must_use]
    pub fn line(&self) -> String {
        self.to_string()
    }

    /// Literal prefix identifying every definition of this name.
    #[must_use]
    pub fn removal_prefix(&self) -> String {
        match self {
            Self::Alias { name, .. } => alias_prefix(name),
            Self::Export { variable, .. } => export_prefix(variable),
        }
    }
}

impl fmt::Display for ShellEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias { name, command } => write!(f, "alias {name}='{command}'"),
            Self::Export { variable, value } => write!(f, "export {variable}={value}"),
        }
    }
}

pub(crate) fn alias_prefix(name: &str) -> String {
    format!("alias {name}=")
}

pub(crate) fn export_prefix(variable: &str) -> String {
    format!("export {variable}=")
}
