//! Cron subsystem errors.

use naspanel_exec::ExecError;
use thiserror::Error;

/// Errors surfaced by the cron subsystem.
#[derive(Debug, Error)]
pub enum CronError {
    /// Schedule expression rejected by the grammar.
    #[error("Invalid cron schedule '{expr}': {reason}")]
    InvalidSchedule { expr: String, reason: String },

    /// Unknown IANA time zone name.
    #[error("Invalid time zone: {0}")]
    InvalidTimezone(String),

    #[error("Command cannot be empty")]
    InvalidCommand,

    #[error("Job not found: {0}")]
    NotFound(String),

    /// Durable storage could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The job's command failed or timed out.
    #[error(transparent)]
    Command(#[from] ExecError),

    #[error("Cron service already started")]
    AlreadyStarted,
}

impl CronError {
    pub(crate) fn invalid_schedule(expr: &str, reason: impl Into<String>) -> Self {
        CronError::InvalidSchedule {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naspanel_exec::ExitReason;

    #[test]
    fn test_invalid_schedule_display() {
        let err = CronError::invalid_schedule("* * * *", "expected 5 or 6 fields, found 4");
        let display = err.to_string();
        assert!(display.contains("* * * *"));
        assert!(display.contains("found 4"));
    }

    #[test]
    fn test_command_error_is_transparent() {
        let err = CronError::from(ExecError::Failed {
            exit: ExitReason::Code(1),
            stdout: String::new(),
            stderr: "no such file".to_string(),
        });
        assert_eq!(err.to_string(), "Command failed with exit code 1: no such file");
    }

    #[test]
    fn test_not_found_display() {
        let err = CronError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Job not found: abc");
    }
}
