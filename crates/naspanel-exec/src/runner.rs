//! Shell command runner.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ExecError, ExitReason};

/// Default ceiling for a single command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Executes shell commands.
///
/// At-most-once: a call never retries.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion or until `timeout` elapses.
    ///
    /// Returns captured stdout when the process exits with status 0.
    async fn run(&self, command: &str, timeout: Duration) -> Result<String, ExecError>;
}

/// Runs commands through `<shell> -c <command>`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::with_shell("sh")
    }

    /// Use a different shell binary (e.g. `bash`).
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, timeout: Duration) -> Result<String, ExecError> {
        if command.trim().is_empty() {
            return Err(ExecError::EmptyCommand);
        }
        if timeout.is_zero() {
            return Err(ExecError::InvalidTimeout);
        }

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group so a timeout takes down everything the shell started.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(ExecError::Spawn)?;
        debug!("Started command (pid {:?}): {}", child.id(), command);

        let stdout = OutputBuffer::default();
        let stderr = OutputBuffer::default();
        let mut stdout_task = stdout.capture(child.stdout.take());
        let mut stderr_task = stderr.capture(child.stderr.take());

        let finished = tokio::time::timeout(timeout, async {
            let status = child.wait().await?;
            let _ = (&mut stdout_task).await;
            let _ = (&mut stderr_task).await;
            Ok::<_, std::io::Error>(status)
        })
        .await;

        match finished {
            Ok(Ok(status)) if status.success() => Ok(stdout.snapshot()),
            Ok(Ok(status)) => {
                let exit = ExitReason::from(status);
                debug!("Command exited with {}: {}", exit, command);
                Err(ExecError::Failed {
                    exit,
                    stdout: stdout.snapshot(),
                    stderr: stderr.snapshot(),
                })
            }
            Ok(Err(e)) => {
                stdout_task.abort();
                stderr_task.abort();
                Err(ExecError::Wait(e))
            }
            Err(_) => {
                terminate(&mut child);
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();

                let timeout_ms = timeout.as_millis() as u64;
                debug!("Command killed after {}ms: {}", timeout_ms, command);
                Err(ExecError::Timeout {
                    timeout_ms,
                    stdout: stdout.snapshot(),
                    stderr: stderr.snapshot(),
                })
            }
        }
    }
}

/// Output collected chunk by chunk so it survives a kill.
#[derive(Debug, Clone, Default)]
struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    fn capture<R>(&self, reader: Option<R>) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = self.clone();
        tokio::spawn(async move {
            let Some(mut reader) = reader else {
                return;
            };
            let mut chunk = [0u8; 4096];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buffer.0.lock().extend_from_slice(&chunk[..n]),
                }
            }
        })
    }

    fn snapshot(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

fn terminate(child: &mut Child) {
    kill_process_group(child);
    if let Err(e) = child.start_kill() {
        debug!("Failed to kill command: {}", e);
    }
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Some(pid) = child.id() {
        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            debug!("Failed to kill process group {}: {}", pid, e);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
