//! Append and prefix-removal operations over a shell resource file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::EDITOR_TARGET;
use crate::entry::{ShellEntry, alias_prefix, export_prefix};
use crate::error::EditorError;

/// Handle on the shell resource file holding alias and export lines.
///
/// The file does not need to exist beforehand; every operation creates it
/// empty on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellResourceFile {
    path: PathBuf,
}

impl ShellResourceFile {
    /// Wraps the resource file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the resource file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file empty when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Create`] when the file cannot be created, or
    /// [`EditorError::Open`] when it exists but cannot be opened.
    pub fn ensure_exists(&self) -> Result<(), EditorError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map(drop)
            .map_err(|source| self.open_error(source))
    }

    fn open_error(&self, source: io::Error) -> EditorError {
        let path = self.path.clone();
        if self.path.exists() {
            EditorError::Open { path, source }
        } else {
            EditorError::Create { path, source }
        }
    }

    /// Appends `alias name='command'` and returns the written line.
    ///
    /// # Errors
    ///
    /// Returns an [`EditorError`] when the file cannot be opened or written.
    pub fn add_alias(&self, name: &str, command: &str) -> Result<String, EditorError> {
        self.add(&ShellEntry::alias(name, command))
    }

    /// Removes every `alias name=` line and returns how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns an [`EditorError`] when the file cannot be read or replaced.
    pub fn remove_alias(&self, name: &str) -> Result<usize, EditorError> {
        self.remove_prefixed(&alias_prefix(name))
    }

    /// Appends `export variable=value` and returns the written line.
    ///
    /// # Errors
    ///
    /// Returns an [`EditorError`] when the file cannot be opened or written.
    pub fn add_export(&self, variable: &str, value: &str) -> Result<String, EditorError> {
        self.add(&ShellEntry::export(variable, value))
    }

    /// Removes every `export variable=` line and returns how many were
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an [`EditorError`] when the file cannot be read or replaced.
    pub fn remove_export(&self, variable: &str) -> Result<usize, EditorError> {
        self.remove_prefixed(&export_prefix(variable))
    }

    /// Appends the rendered entry as its own line.
    ///
    /// No uniqueness check is made; adding the same entry twice yields two
    /// lines. When the file ends without a newline one is written first so
    /// the entry never joins the previous line.
    ///
    /// # Errors
    ///
    /// Returns an [`EditorError`] when the file cannot be opened or written.
    pub fn add(&self, entry: &ShellEntry) -> Result<String, EditorError> {
        let line = entry.line();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.open_error(source))?;

        let mut payload = String::with_capacity(line.len() + 2);
        if !ends_with_newline(&mut file).map_err(|source| EditorError::Read {
            path: self.path.clone(),
            source,
        })? {
            payload.push('\n');
        }
        payload.push_str(&line);
        payload.push('\n');

        file.write_all(payload.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| EditorError::Write {
                path: self.path.clone(),
                source,
            })?;

        info!(
            target: EDITOR_TARGET,
            file = %self.path.display(),
            line = %line,
            "appended resource file entry"
        );
        Ok(line)
    }

    /// Drops every line whose trimmed text starts with `prefix`.
    ///
    /// Other lines keep their exact bytes, including line endings. When no
    /// line matches the file is left untouched.
    fn remove_prefixed(&self, prefix: &str) -> Result<usize, EditorError> {
        self.ensure_exists()?;
        let original = fs::read_to_string(&self.path).map_err(|source| EditorError::Read {
            path: self.path.clone(),
            source,
        })?;

        let (retained, removed) = filter_lines(&original, prefix);
        if removed == 0 {
            debug!(
                target: EDITOR_TARGET,
                file = %self.path.display(),
                prefix,
                "no matching lines; resource file unchanged"
            );
            return Ok(0);
        }

        self.replace_contents(&retained)?;
        info!(
            target: EDITOR_TARGET,
            file = %self.path.display(),
            prefix,
            removed,
            "removed resource file entries"
        );
        Ok(removed)
    }

    /// Writes `content` to a sibling temporary file and renames it over the
    /// resource file, keeping the original permission bits.
    ///
    /// Symlinked resource files are rewritten at their target so the link
    /// itself survives.
    fn replace_contents(&self, content: &str) -> Result<(), EditorError> {
        let target = fs::canonicalize(&self.path).map_err(|source| EditorError::Read {
            path: self.path.clone(),
            source,
        })?;
        let permissions = fs::metadata(&target)
            .map_err(|source| EditorError::Read {
                path: target.clone(),
                source,
            })?
            .permissions();
        let parent = target.parent().unwrap_or_else(|| Path::new("."));

        let write_error = |source| EditorError::Write {
            path: target.clone(),
            source,
        };
        let mut temp_file = NamedTempFile::new_in(parent).map_err(write_error)?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(write_error)?;
        temp_file
            .as_file()
            .set_permissions(permissions)
            .map_err(write_error)?;
        temp_file.as_file().sync_all().map_err(write_error)?;

        temp_file
            .persist(&target)
            .map_err(|err| EditorError::Persist {
                path: target.clone(),
                source: err.error,
            })?;
        Ok(())
    }
}

/// Splits `content` into retained text and the number of dropped lines.
fn filter_lines(content: &str, prefix: &str) -> (String, usize) {
    let mut retained = String::with_capacity(content.len());
    let mut removed = 0usize;
    for line in content.split_inclusive('\n') {
        if line.trim().starts_with(prefix) {
            removed += 1;
        } else {
            retained.push_str(line);
        }
    }
    (retained, removed)
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last == *b"\n")
}
