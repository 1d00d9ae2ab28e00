// SPDX-License-Identifier: MIT OR Apache-2.0
//! Running the service process to completion.

use async_trait::async_trait;
use jal_core::{ServiceSpec, Termination};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs one service to completion and reports how it ended.
///
/// Implementations spawn at most once and never retry. A failure to start
/// is reported as [`Termination::LaunchFailed`], not as an error, so the
/// supervisor handles it on the same branch as a crash.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Launch `spec` from `home` and block until it terminates.
    async fn run(&self, spec: &ServiceSpec, home: &Path) -> Termination;
}

/// Spawns the service as a real child process with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioRunner;

impl TokioRunner {
    /// Resolve the program the same way `check` reports it; an unresolved
    /// name is passed through so the OS produces the spawn error.
    fn program(spec: &ServiceSpec, home: &Path) -> PathBuf {
        jal_which::which_in(home, &spec.command).unwrap_or_else(|| PathBuf::from(&spec.command))
    }
}

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn run(&self, spec: &ServiceSpec, home: &Path) -> Termination {
        let program = Self::program(spec, home);
        let mut cmd = Command::new(&program);
        cmd.args(spec.argv())
            .envs(&spec.env)
            .current_dir(home)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    target: "jal.supervisor",
                    program = %program.display(),
                    error = %e,
                    "service failed to start"
                );
                return Termination::LaunchFailed {
                    reason: e.to_string(),
                };
            }
        };

        info!(
            target: "jal.supervisor",
            pid = child.id(),
            program = %program.display(),
            "service started"
        );

        // Ctrl+C reaches the whole console group. The service gets it too and
        // decides its own exit status; the launcher must outlive it to report
        // that status, so interrupts are only logged here.
        let mut listen_for_interrupt = true;
        let status = loop {
            tokio::select! {
                status = child.wait() => break status,
                res = tokio::signal::ctrl_c(), if listen_for_interrupt => match res {
                    Ok(()) => info!(
                        target: "jal.supervisor",
                        "interrupt received; waiting for the service to stop"
                    ),
                    Err(e) => {
                        debug!(target: "jal.supervisor", error = %e, "interrupt listener unavailable");
                        listen_for_interrupt = false;
                    }
                },
            }
        };

        match status {
            Ok(status) => {
                let termination = Termination::from_status(status);
                debug!(target: "jal.supervisor", %termination, "service exited");
                termination
            }
            Err(e) => {
                warn!(target: "jal.supervisor", error = %e, "lost track of the service");
                Termination::Lost {
                    reason: e.to_string(),
                }
            }
        }
    }
}
