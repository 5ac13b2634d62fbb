//! Process-backed implementation of [`PrivilegedOps`].
//!
//! Copies run `install` into a hidden sibling of the destination and then
//! `mv -f` it into place, so the destination is replaced by a single rename.
//! When either step fails the sibling is removed on a best-effort basis.
//! Validation runs `<validator> -c -f <path>`. With elevation enabled every
//! command is prefixed by the elevation program (normally `sudo`). Every
//! child process is bounded by a timeout and killed when it overruns.

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::PrivilegeError;
use crate::outcome::ValidationVerdict;
use crate::privileged::{Ownership, PrivilegedOps};

/// Tracing target for privileged process supervision.
const PROCESS_TARGET: &str = "rcwarden_sudoers::process";

const INSTALL_PROGRAM: &str = "install";
const MOVE_PROGRAM: &str = "mv";
const REMOVE_PROGRAM: &str = "rm";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs privileged operations as child processes.
#[derive(Debug, Clone)]
pub struct SystemPrivilegedOps {
    elevation: Option<String>,
    validator: String,
    timeout: Duration,
}

impl SystemPrivilegedOps {
    /// Builds an executor.
    ///
    /// `elevation` is the program prefixed to every command, or `None` when
    /// the caller already has the required privileges. Ownership flags are
    /// only passed to `install` when elevating.
    #[must_use]
    pub fn new(elevation: Option<&str>, validator: impl Into<String>, timeout: Duration) -> Self {
        Self {
            elevation: elevation.map(str::to_owned),
            validator: validator.into(),
            timeout,
        }
    }

    fn command<I, S>(&self, program: &str, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = self.elevation.as_deref().map_or_else(
            || Command::new(program),
            |elevation| {
                let mut elevated = Command::new(elevation);
                elevated.arg(program);
                elevated
            },
        );
        command.args(args);
        command
    }

    /// Runs a command and fails unless it exits successfully.
    fn run_checked<I, S>(&self, program: &str, args: I) -> Result<(), PrivilegeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.run(program, args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(PrivilegeError::NonZeroExit {
                program: program.to_owned(),
                status: output.status.code().unwrap_or(-1),
                stderr: output.stderr,
            })
        }
    }

    /// Best-effort removal of a temporary copy left by a failed step.
    fn discard(&self, staged: &Path) {
        let cleanup = [OsStr::new("-f"), OsStr::new("--"), staged.as_os_str()];
        if let Err(error) = self.run_checked(REMOVE_PROGRAM, cleanup) {
            warn!(
                target: PROCESS_TARGET,
                file = %staged.display(),
                %error,
                "failed to remove temporary copy"
            );
        }
    }

    fn run<I, S>(&self, program: &str, args: I) -> Result<ProcessOutput, PrivilegeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = self.command(program, args);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            target: PROCESS_TARGET,
            program,
            elevated = self.elevation.is_some(),
            "spawning privileged process"
        );
        let mut child = command.spawn().map_err(|source| PrivilegeError::Spawn {
            program: program.to_owned(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = wait_for_exit(program, &mut child, self.timeout)?;
        Ok(ProcessOutput {
            status,
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

impl PrivilegedOps for SystemPrivilegedOps {
    fn copy(
        &self,
        source: &Path,
        destination: &Path,
        ownership: Ownership,
    ) -> Result<(), PrivilegeError> {
        let staged = sibling_temp_path(destination);
        let mut install_args: Vec<OsString> = vec![
            OsString::from("-m"),
            OsString::from(format!("{:o}", ownership.mode())),
        ];
        if self.elevation.is_some() {
            let (uid, gid) = ownership.owner_ids();
            install_args.extend([
                OsString::from("-o"),
                OsString::from(uid.to_string()),
                OsString::from("-g"),
                OsString::from(gid.to_string()),
            ]);
        }
        install_args.extend([
            OsString::from("--"),
            source.as_os_str().to_owned(),
            staged.as_os_str().to_owned(),
        ]);
        let move_args = [
            OsStr::new("-f"),
            OsStr::new("--"),
            staged.as_os_str(),
            destination.as_os_str(),
        ];
        let moved = self
            .run_checked(INSTALL_PROGRAM, &install_args)
            .and_then(|()| self.run_checked(MOVE_PROGRAM, move_args));
        if let Err(error) = moved {
            self.discard(&staged);
            return Err(error);
        }
        debug!(
            target: PROCESS_TARGET,
            source = %source.display(),
            destination = %destination.display(),
            "privileged copy completed"
        );
        Ok(())
    }

    fn validate(&self, path: &Path) -> Result<ValidationVerdict, PrivilegeError> {
        let args = [OsStr::new("-c"), OsStr::new("-f"), path.as_os_str()];
        let output = self.run(&self.validator, args)?;
        let mut diagnostics = output.stdout;
        diagnostics.push_str(&output.stderr);
        debug!(
            target: PROCESS_TARGET,
            validator = %self.validator,
            status = output.status.code().unwrap_or(-1),
            "validator finished"
        );
        Ok(ValidationVerdict::from_exit(
            output.status.success(),
            diagnostics.trim_end(),
        ))
    }
}

struct ProcessOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

/// Hidden temporary name next to `destination`, so the final `mv` is a
/// rename within one directory.
fn sibling_temp_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map_or_else(|| OsString::from("target"), OsStr::to_owned);
    let mut temp_name = OsString::from(".");
    temp_name.push(name);
    temp_name.push(format!(".rcwarden-{}.tmp", std::process::id()));
    destination.with_file_name(temp_name)
}

/// Reads a pipe on a helper thread so a chatty child cannot fill the pipe
/// buffer and stall.
fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut bytes = Vec::new();
            if reader.read_to_end(&mut bytes).is_err() {
                return String::new();
            }
            String::from_utf8_lossy(&bytes).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Waits for the child to exit, killing it once `timeout` has elapsed.
fn wait_for_exit(
    program: &str,
    child: &mut Child,
    timeout: Duration,
) -> Result<ExitStatus, PrivilegeError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    target: PROCESS_TARGET,
                    program,
                    ?status,
                    "privileged process exited"
                );
                return Ok(status);
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    warn!(
                        target: PROCESS_TARGET,
                        program,
                        ?timeout,
                        "privileged process timed out, killing it"
                    );
                    drop(child.kill());
                    drop(child.wait());
                    return Err(PrivilegeError::Timeout {
                        program: program.to_owned(),
                        timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                return Err(PrivilegeError::Io {
                    program: program.to_owned(),
                    source,
                });
            }
        }
    }
}
