use super::*;
use std::time::Instant;

fn runner() -> ShellRunner {
    ShellRunner::new()
}

#[test]
fn test_default_shell() {
    assert_eq!(ShellRunner::default().shell(), "sh");
    assert_eq!(ShellRunner::with_shell("bash").shell(), "bash");
}

#[test]
fn test_default_timeout() {
    assert_eq!(DEFAULT_TIMEOUT, Duration::from_millis(30_000));
}

#[tokio::test]
async fn test_run_echo() {
    let output = runner().run("echo hello", DEFAULT_TIMEOUT).await.unwrap();
    assert_eq!(output.trim(), "hello");
}

#[tokio::test]
async fn test_run_returns_stdout_only() {
    let output = runner()
        .run("echo out; echo err >&2", DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(output.trim(), "out");
}

#[tokio::test]
async fn test_run_failure_keeps_output() {
    let err = runner()
        .run("echo partial; echo broken >&2; exit 3", DEFAULT_TIMEOUT)
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), Some(3));
    assert_eq!(err.stdout().trim(), "partial");
    assert_eq!(err.stderr().trim(), "broken");
    assert!(err.to_string().contains("exit code 3"));
}

#[tokio::test]
async fn test_run_timeout_kills_and_keeps_partial_output() {
    let started = Instant::now();
    let err = runner()
        .run("echo started; sleep 10; echo never", Duration::from_millis(500))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(err.stdout().contains("started"));
    assert!(!err.stdout().contains("never"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_run_empty_command() {
    let err = runner().run("   ", DEFAULT_TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ExecError::EmptyCommand));
}

#[tokio::test]
async fn test_run_zero_timeout() {
    let err = runner().run("true", Duration::ZERO).await.unwrap_err();
    assert!(matches!(err, ExecError::InvalidTimeout));
}

#[tokio::test]
async fn test_run_missing_shell() {
    let err = ShellRunner::with_shell("/nonexistent/shell-binary")
        .run("true", DEFAULT_TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Spawn(_)));
}

#[tokio::test]
async fn test_run_large_output() {
    let output = runner()
        .run("seq 1 20000", DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(output.lines().count(), 20000);
    assert_eq!(output.lines().last(), Some("20000"));
}
