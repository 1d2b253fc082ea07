//! Tests for CommandRemover with a mock command runner

#![cfg(unix)]

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

use purgetree::config::Settings;
use purgetree::infrastructure::di::ServiceContainer;
use purgetree::infrastructure::remover::CommandRemover;
use purgetree::infrastructure::traits::{CommandRunner, ObjectRemover};

/// Records invocations and answers with a fixed exit code.
struct MockRunner {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    exit_code: i32,
    stderr: &'static str,
}

impl MockRunner {
    fn exiting(exit_code: i32, stderr: &'static str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            exit_code,
            stderr,
        })
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        self.calls.lock().unwrap().push((
            cmd.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        Ok(Output {
            status: ExitStatus::from_raw(self.exit_code << 8),
            stdout: Vec::new(),
            stderr: self.stderr.as_bytes().to_vec(),
        })
    }
}

#[test]
fn given_template_when_removing_then_runs_command_with_id() {
    // Arrange
    let runner = MockRunner::exiting(0, "");
    let remover = CommandRemover::new(
        runner.clone(),
        vec!["purge-object".into(), "--pid".into(), "{id}".into()],
    )
    .unwrap();

    // Act
    remover.remove("book:7").unwrap();

    // Assert
    let calls = runner.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "purge-object");
    assert_eq!(calls[0].1, ["--pid", "book:7"]);
}

#[test]
fn given_failing_command_when_removing_then_error_carries_exit_code_and_stderr() {
    let runner = MockRunner::exiting(3, "object is locked\n");
    let remover = CommandRemover::new(runner, vec!["purge-object".into(), "{id}".into()]).unwrap();

    let err = remover.remove("book:7").unwrap_err();

    assert_eq!(err.to_string(), "purge-object exited with 3: object is locked");
}

#[test]
fn given_container_with_command_when_building_service_then_uses_runner() {
    let runner = MockRunner::exiting(0, "");
    let settings = Settings {
        remove_command: vec!["purge-object".into(), "{id}".into()],
        ..Settings::default()
    };
    let container = ServiceContainer::with_deps(settings, runner.clone());

    container.remover(false).unwrap().remove("a").unwrap();

    assert_eq!(runner.calls.lock().unwrap()[0].1, ["a"]);
}

#[test]
fn given_real_runner_when_command_is_true_then_succeeds() {
    let settings = Settings {
        remove_command: vec!["true".into(), "{id}".into()],
        ..Settings::default()
    };
    let container = ServiceContainer::new(settings);

    assert!(container.remover(false).unwrap().remove("x").is_ok());
}
