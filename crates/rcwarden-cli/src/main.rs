//! Binary entry point for `rcwarden`.
//!
//! All behaviour lives in [`rcwarden_cli::run`]; the binary only wires the
//! process arguments and standard streams into it.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    rcwarden_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
