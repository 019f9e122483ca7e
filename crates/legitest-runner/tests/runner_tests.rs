#![cfg(unix)]

use std::fs;
use std::sync::{Arc, Mutex};

use legitest_runner::{
    CommandTestRunner, OutputCallback, OutputType, RunnerConfig, TestOutcome, TestRunner,
};
use tempfile::TempDir;

fn shell(script: &str) -> CommandTestRunner {
    CommandTestRunner::from_command(&["sh", "-c", script]).unwrap()
}

#[tokio::test]
async fn test_zero_exit_is_passed() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf());

    let run = shell("echo ok").run(&config).await;

    assert_eq!(run.outcome, TestOutcome::Passed);
    assert_eq!(run.exit_code, 0);
    assert_eq!(run.stdout, "ok");
}

#[tokio::test]
async fn test_non_zero_exit_is_failed_not_error() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf());

    let run = shell("echo 'FAILED (failures=1)' >&2; exit 3").run(&config).await;

    assert_eq!(run.outcome, TestOutcome::Failed);
    assert_eq!(run.exit_code, 3);
    assert_eq!(run.stderr, "FAILED (failures=1)");
}

#[tokio::test]
async fn test_invalid_utf8_output_keeps_exit_status() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf());

    let run = shell("printf 'caf\\351\\n'; printf 'bad \\377' >&2; exit 0")
        .run(&config)
        .await;

    assert_eq!(run.outcome, TestOutcome::Passed);
    assert_eq!(run.exit_code, 0);
    assert_eq!(run.stdout, "caf\u{FFFD}");
    assert_eq!(run.stderr, "bad \u{FFFD}");
}

#[tokio::test]
async fn test_invalid_utf8_output_keeps_failure() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf());

    let run = shell("printf '\\377\\n'; exit 2").run(&config).await;

    assert_eq!(run.outcome, TestOutcome::Failed);
    assert_eq!(run.exit_code, 2);
}

#[tokio::test]
async fn test_output_after_last_newline_is_kept() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf());

    let run = shell("printf 'Ran 2 tests\\r\\nOK'").run(&config).await;

    assert!(run.passed());
    assert_eq!(run.stdout, "Ran 2 tests\nOK");
}

#[tokio::test]
async fn test_runs_inside_working_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("marker"), "here").unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf());

    let run = shell("test \"$(cat marker)\" = here").run(&config).await;

    assert!(run.passed());
}

#[tokio::test]
async fn test_env_vars_are_passed() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf())
        .with_env("LEGITEST_PHASE".to_string(), "post".to_string());

    let run = shell("test \"$LEGITEST_PHASE\" = post").run(&config).await;

    assert!(run.passed());
}

#[tokio::test]
async fn test_missing_program_is_failed_run() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf());
    let runner = CommandTestRunner::from_command(&["legitest-no-such-program"]).unwrap();

    let run = runner.run(&config).await;

    assert_eq!(run.outcome, TestOutcome::Failed);
    assert_eq!(run.exit_code, -1);
    assert!(!run.stderr.is_empty());
    assert!(!runner.is_available().await);
}

#[tokio::test]
async fn test_callback_sees_every_line() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().to_path_buf());
    let seen: Arc<Mutex<Vec<(String, OutputType)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: OutputCallback = Arc::new(move |line: &str, stream: OutputType| {
        sink.lock().unwrap().push((line.to_string(), stream));
    });

    let run = shell("echo one; echo two; echo three >&2")
        .run_with_callback(&config, Some(callback))
        .await;

    assert!(run.passed());
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.contains(&("one".to_string(), OutputType::Stdout)));
    assert!(seen.contains(&("two".to_string(), OutputType::Stdout)));
    assert!(seen.contains(&("three".to_string(), OutputType::Stderr)));
}

#[tokio::test]
async fn test_availability_checks() {
    let sh = CommandTestRunner::from_command(&["sh", "-c", "true"]).unwrap();
    assert!(sh.is_available().await);

    let relative = CommandTestRunner::from_command(&["./run_tests.sh"]).unwrap();
    assert!(relative.is_available().await);

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.sh");
    let absolute = CommandTestRunner::from_command(&[missing.to_string_lossy().as_ref()]).unwrap();
    assert!(!absolute.is_available().await);
}
