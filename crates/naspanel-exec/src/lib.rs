//! Shell command execution for the NAS panel.
//!
//! Every system integration in the panel ends in a shell command. This crate
//! runs one command to completion or timeout and keeps whatever the process
//! wrote, even when it fails: SMART and apt tooling print useful data next to
//! non-zero exit codes.

mod error;
mod runner;

pub use error::{ExecError, ExitReason};
pub use runner::{CommandRunner, ShellRunner, DEFAULT_TIMEOUT};
