//! Command execution errors.

use std::fmt;
use std::process::ExitStatus;

use thiserror::Error;

/// How a process ended when it did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Exited with a non-zero status code.
    Code(i32),
    /// Terminated by a signal.
    Signal(i32),
    /// The platform reported neither.
    Unknown,
}

impl From<ExitStatus> for ExitReason {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitReason::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitReason::Signal(signal);
            }
        }

        ExitReason::Unknown
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Code(code) => write!(f, "exit code {}", code),
            ExitReason::Signal(signal) => write!(f, "signal {}", signal),
            ExitReason::Unknown => write!(f, "unknown exit status"),
        }
    }
}

/// Command execution error.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Command is empty")]
    EmptyCommand,

    #[error("Timeout must be greater than zero")]
    InvalidTimeout,

    #[error("Failed to start command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed while waiting for command: {0}")]
    Wait(#[source] std::io::Error),

    /// The process ran and did not exit successfully.
    #[error("Command failed with {exit}{}", stderr_suffix(.stderr))]
    Failed {
        exit: ExitReason,
        stdout: String,
        stderr: String,
    },

    /// The process exceeded its deadline and was killed.
    #[error("Command timed out after {timeout_ms}ms")]
    Timeout {
        timeout_ms: u64,
        stdout: String,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl ExecError {
    /// Output captured before the failure. Empty when the process never ran.
    pub fn stdout(&self) -> &str {
        match self {
            ExecError::Failed { stdout, .. } | ExecError::Timeout { stdout, .. } => stdout,
            _ => "",
        }
    }

    /// Error output captured before the failure.
    pub fn stderr(&self) -> &str {
        match self {
            ExecError::Failed { stderr, .. } | ExecError::Timeout { stderr, .. } => stderr,
            _ => "",
        }
    }

    /// Exit code, when the process exited on its own with one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::Failed {
                exit: ExitReason::Code(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::Timeout { .. })
    }
}
