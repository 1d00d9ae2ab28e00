// SPDX-License-Identifier: MIT OR Apache-2.0
//! Supervision tests against a scripted runner.

use async_trait::async_trait;
use jal_console::{Acknowledge, NoPause};
use jal_core::{LifecycleState, Outcome, ServiceSpec, Termination};
use jal_supervisor::{OperatorIo, ProcessRunner, Supervisor};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns a fixed termination and records each invocation.
struct ScriptedRunner {
    termination: Termination,
    calls: Mutex<Vec<(ServiceSpec, PathBuf)>>,
}

impl ScriptedRunner {
    fn new(termination: Termination) -> Self {
        Self {
            termination,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(ServiceSpec, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, spec: &ServiceSpec, home: &Path) -> Termination {
        self.calls
            .lock()
            .unwrap()
            .push((spec.clone(), home.to_path_buf()));
        self.termination.clone()
    }
}

#[async_trait]
impl ProcessRunner for &ScriptedRunner {
    async fn run(&self, spec: &ServiceSpec, home: &Path) -> Termination {
        (**self).run(spec, home).await
    }
}

/// Records each prompt it is shown; the handle stays with the test.
#[derive(Clone, Default)]
struct CountingAck {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl CountingAck {
    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Acknowledge for CountingAck {
    fn acknowledge(&mut self, prompt: &str) -> io::Result<bool> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(true)
    }
}

/// Waits for a message sent from another task on the runtime.
struct ChannelAck(mpsc::Receiver<()>);

impl Acknowledge for ChannelAck {
    fn acknowledge(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(self.0.recv_timeout(Duration::from_secs(5)).is_ok())
    }
}

struct BrokenAck;

impl Acknowledge for BrokenAck {
    fn acknowledge(&mut self, _prompt: &str) -> io::Result<bool> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin gone"))
    }
}

struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Captured {
    fn new() -> Self {
        Self {
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

fn spec() -> ServiceSpec {
    ServiceSpec::default()
}

// ---------------------------------------------------------------------------
// 1. Success branch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn normal_exit_is_silent_and_does_not_wait() {
    let runner = ScriptedRunner::new(Termination::Exited { code: 0 });
    let supervisor = Supervisor::new(&runner, spec(), "/srv/assistant");
    let mut out = Captured::new();
    let ack = CountingAck::default();

    let report = supervisor
        .supervise(OperatorIo {
            stdout: &mut out.stdout,
            stderr: &mut out.stderr,
            ack: Box::new(ack.clone()),
        })
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Success);
    assert_eq!(report.exit_code(), 0);
    assert!(out.stdout.is_empty());
    assert!(out.stderr.is_empty());
    assert!(ack.prompts().is_empty());
    let states: Vec<_> = report.history.iter().map(|t| t.to).collect();
    assert_eq!(
        states,
        vec![LifecycleState::Running, LifecycleState::SuccessExit]
    );
}

#[tokio::test]
async fn service_is_invoked_exactly_once_from_home() {
    let runner = ScriptedRunner::new(Termination::Exited { code: 0 });
    let supervisor = Supervisor::new(&runner, spec(), "/srv/assistant");
    let mut out = Captured::new();

    supervisor
        .supervise(OperatorIo {
            stdout: &mut out.stdout,
            stderr: &mut out.stderr,
            ack: Box::new(NoPause),
        })
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, spec());
    assert_eq!(calls[0].1, PathBuf::from("/srv/assistant"));
}

// ---------------------------------------------------------------------------
// 2. Failure branch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_zero_exit_reports_and_waits() {
    let runner = ScriptedRunner::new(Termination::Exited { code: 1 });
    let supervisor = Supervisor::new(&runner, spec(), "/srv/assistant");
    let mut out = Captured::new();
    let ack = CountingAck::default();

    let report = supervisor
        .supervise(OperatorIo {
            stdout: &mut out.stdout,
            stderr: &mut out.stderr,
            ack: Box::new(ack.clone()),
        })
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        Outcome::Failure {
            termination: Termination::Exited { code: 1 },
            acknowledged: true,
        }
    );
    assert_eq!(report.exit_code(), 1);
    assert!(out.stdout.is_empty());
    let stderr = out.stderr();
    assert!(stderr.contains("stopped unexpectedly"));
    assert!(stderr.contains("exit code 1"));
    assert_eq!(ack.prompts(), vec![jal_console::DEFAULT_PROMPT.to_string()]);

    let states: Vec<_> = report.history.iter().map(|t| t.to).collect();
    assert_eq!(
        states,
        vec![
            LifecycleState::Running,
            LifecycleState::FailureWait,
            LifecycleState::FailureExit,
        ]
    );
}

#[tokio::test]
async fn launch_failure_takes_the_failure_branch() {
    let runner = ScriptedRunner::new(Termination::LaunchFailed {
        reason: "program not found".into(),
    });
    let supervisor = Supervisor::new(&runner, spec(), "/srv/assistant");
    let mut out = Captured::new();
    let ack = CountingAck::default();

    let report = supervisor
        .supervise(OperatorIo {
            stdout: &mut out.stdout,
            stderr: &mut out.stderr,
            ack: Box::new(ack.clone()),
        })
        .await
        .unwrap();

    assert!(report.outcome.is_failure());
    assert_eq!(report.exit_code(), 1);
    assert!(out.stderr().contains("failed to start: program not found"));
    assert_eq!(ack.prompts().len(), 1);
}

#[tokio::test]
async fn custom_headline_and_prompt() {
    let runner = ScriptedRunner::new(Termination::Exited { code: 3 });
    let supervisor = Supervisor::new(&runner, spec(), "/srv/assistant")
        .with_failure_message(Some("程式意外結束".into()))
        .with_prompt("按 Enter 鍵關閉...");
    let mut out = Captured::new();
    let ack = CountingAck::default();

    let report = supervisor
        .supervise(OperatorIo {
            stdout: &mut out.stdout,
            stderr: &mut out.stderr,
            ack: Box::new(ack.clone()),
        })
        .await
        .unwrap();

    assert_eq!(report.exit_code(), 3);
    assert!(out.stderr().contains("程式意外結束"));
    assert_eq!(ack.prompts(), vec!["按 Enter 鍵關閉...".to_string()]);
}

#[tokio::test]
async fn broken_input_still_ends_in_failure() {
    let runner = ScriptedRunner::new(Termination::Signalled { signal: Some(9) });
    let supervisor = Supervisor::new(&runner, spec(), "/srv/assistant");
    let mut out = Captured::new();

    let report = supervisor
        .supervise(OperatorIo {
            stdout: &mut out.stdout,
            stderr: &mut out.stderr,
            ack: Box::new(BrokenAck),
        })
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        Outcome::Failure {
            termination: Termination::Signalled { signal: Some(9) },
            acknowledged: false,
        }
    );
    assert_eq!(report.history.last().unwrap().to, LifecycleState::FailureExit);
}

#[tokio::test]
async fn no_pause_does_not_block() {
    let runner = ScriptedRunner::new(Termination::Exited { code: 2 });
    let supervisor = Supervisor::new(&runner, spec(), "/srv/assistant");
    let mut out = Captured::new();

    let report = supervisor
        .supervise(OperatorIo {
            stdout: &mut out.stdout,
            stderr: &mut out.stderr,
            ack: Box::new(NoPause),
        })
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        Outcome::Failure {
            termination: Termination::Exited { code: 2 },
            acknowledged: false,
        }
    );
    assert!(out.stderr().contains("exit code 2"));
}

#[tokio::test]
async fn acknowledgment_wait_leaves_the_runtime_free() {
    // Single-threaded runtime: the sender only runs if the wait is off-thread.
    let runner = ScriptedRunner::new(Termination::Exited { code: 1 });
    let supervisor = Supervisor::new(&runner, spec(), "/srv/assistant");
    let mut out = Captured::new();
    let (tx, rx) = mpsc::channel();
    let sender = tokio::spawn(async move {
        tx.send(()).unwrap();
    });

    let report = supervisor
        .supervise(OperatorIo {
            stdout: &mut out.stdout,
            stderr: &mut out.stderr,
            ack: Box::new(ChannelAck(rx)),
        })
        .await
        .unwrap();

    sender.await.unwrap();
    assert_eq!(
        report.outcome,
        Outcome::Failure {
            termination: Termination::Exited { code: 1 },
            acknowledged: true,
        }
    );
}
