// SPDX-License-Identifier: MIT OR Apache-2.0
//! The launch-and-supervise lifecycle.

use crate::home::Home;
use crate::runner::ProcessRunner;
use jal_config::LauncherConfig;
use jal_console::{Acknowledge, DEFAULT_PROMPT, Diagnostic, EncodingMode};
use jal_core::{
    LifecycleError, LifecycleManager, LifecycleState, LifecycleTransition, Outcome, ServiceSpec,
};
use jal_error::{ErrorCode, LauncherError};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the supervisor talks to the operator.
pub struct OperatorIo<'a> {
    /// Banner output.
    pub stdout: &'a mut (dyn Write + Send),
    /// Diagnostic output.
    pub stderr: &'a mut (dyn Write + Send),
    /// Blocks on the failure branch. Runs on a blocking thread so an
    /// interrupt can end the wait.
    pub ack: Box<dyn Acknowledge>,
}

/// What happened during one supervised run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Terminal branch taken.
    pub outcome: Outcome,
    /// Every lifecycle transition, in order.
    pub history: Vec<LifecycleTransition>,
    /// How long the service ran.
    pub uptime: Option<Duration>,
    /// Console encoding in effect for the run.
    pub encoding: EncodingMode,
}

impl RunReport {
    /// Exit code the launcher should end with.
    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}

/// Runs one service to completion and reports abnormal termination.
pub struct Supervisor<R> {
    runner: R,
    spec: ServiceSpec,
    home: PathBuf,
    failure_message: Option<String>,
    prompt: String,
}

impl<R: ProcessRunner> Supervisor<R> {
    /// Supervisor for `spec`, launched from `home`.
    pub fn new(runner: R, spec: ServiceSpec, home: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            spec,
            home: home.into(),
            failure_message: None,
            prompt: DEFAULT_PROMPT.into(),
        }
    }

    /// Override the diagnostic headline.
    pub fn with_failure_message(mut self, message: Option<String>) -> Self {
        self.failure_message = message;
        self
    }

    /// Override the acknowledgment prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The service being supervised.
    pub fn spec(&self) -> &ServiceSpec {
        &self.spec
    }

    /// Invoke the service once, wait for it, and take the matching branch.
    ///
    /// On success nothing is written. On failure the diagnostic is written
    /// and the acknowledgment is awaited before this returns; I/O problems
    /// on either step are logged and do not change the outcome.
    pub async fn supervise(&self, io: OperatorIo<'_>) -> Result<RunReport, LauncherError> {
        let mut lifecycle = LifecycleManager::new();
        step(&mut lifecycle, LifecycleState::Running, self.spec.to_string())?;

        let termination = self.runner.run(&self.spec, &self.home).await;

        if termination.is_normal() {
            step(&mut lifecycle, LifecycleState::SuccessExit, termination.to_string())?;
            info!(target: "jal.supervisor", "service stopped normally");
            return Ok(report(Outcome::Success, lifecycle));
        }

        step(&mut lifecycle, LifecycleState::FailureWait, termination.to_string())?;
        info!(target: "jal.supervisor", %termination, "service terminated abnormally");

        let mut diagnostic = Diagnostic::new(self.spec.to_string(), termination.clone())
            .with_home(&self.home)
            .with_uptime(lifecycle.service_uptime());
        if let Some(ref headline) = self.failure_message {
            diagnostic = diagnostic.with_headline(headline.clone());
        }
        if let Err(e) = diagnostic.write_to(&mut *io.stderr) {
            warn!(target: "jal.supervisor", error = %e, "could not write failure diagnostic");
        }

        let acknowledged = self.await_acknowledgment(io.ack).await;
        let reason = if acknowledged {
            "acknowledged"
        } else {
            "not acknowledged"
        };
        step(&mut lifecycle, LifecycleState::FailureExit, reason.to_string())?;

        Ok(report(
            Outcome::Failure {
                termination,
                acknowledged,
            },
            lifecycle,
        ))
    }

    /// Interrupting the wait counts as an acknowledgment.
    async fn await_acknowledgment(&self, mut ack: Box<dyn Acknowledge>) -> bool {
        let prompt = self.prompt.clone();
        let read = tokio::task::spawn_blocking(move || ack.acknowledge(&prompt));

        tokio::select! {
            joined = read => match joined {
                Ok(Ok(acknowledged)) => acknowledged,
                Ok(Err(e)) => {
                    warn!(target: "jal.supervisor", error = %e, "could not read acknowledgment");
                    false
                }
                Err(e) => {
                    warn!(target: "jal.supervisor", error = %e, "acknowledgment task failed");
                    false
                }
            },
            () = interrupted() => {
                info!(target: "jal.supervisor", "interrupt received; closing");
                true
            }
        }
    }
}

/// Full `run()`: enter home, print the banner, then supervise.
///
/// The console encoding is switched by the caller before any output and
/// handed in with [`Launcher::with_encoding`].
pub struct Launcher<R> {
    home: Home,
    config: LauncherConfig,
    runner: R,
    encoding: EncodingMode,
}

impl<R: ProcessRunner> Launcher<R> {
    /// Launcher for the service described by `config`.
    pub fn new(home: Home, config: LauncherConfig, runner: R) -> Self {
        Self {
            home,
            config,
            runner,
            encoding: EncodingMode::Inherited,
        }
    }

    /// Record the console encoding already in effect.
    pub fn with_encoding(mut self, encoding: EncodingMode) -> Self {
        self.encoding = encoding;
        self
    }

    /// Run the service once. Home is entered before anything is launched.
    pub async fn run(self, io: OperatorIo<'_>) -> Result<RunReport, LauncherError> {
        self.home.enter()?;
        debug!(target: "jal.console", encoding = %self.encoding, "console ready");

        if let Some(ref banner) = self.config.banner
            && !banner.is_empty()
        {
            if let Err(e) = writeln!(io.stdout, "{banner}").and_then(|()| io.stdout.flush()) {
                warn!(target: "jal.supervisor", error = %e, "could not write banner");
            }
        }

        let supervisor = Supervisor::new(
            self.runner,
            self.config.service_spec(),
            self.home.path().to_path_buf(),
        )
        .with_failure_message(self.config.failure_message.clone());

        let mut report = supervisor.supervise(io).await?;
        report.encoding = self.encoding;
        Ok(report)
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!(target: "jal.supervisor", error = %e, "interrupt listener unavailable");
        std::future::pending::<()>().await;
    }
}

fn step(
    lifecycle: &mut LifecycleManager,
    to: LifecycleState,
    reason: String,
) -> Result<(), LauncherError> {
    lifecycle
        .transition(to, Some(reason))
        .map_err(lifecycle_error)?;
    debug!(target: "jal.supervisor", state = %to, "lifecycle transition");
    Ok(())
}

fn lifecycle_error(e: LifecycleError) -> LauncherError {
    LauncherError::new(ErrorCode::LifecycleInvalidTransition, e.to_string()).with_source(e)
}

fn report(outcome: Outcome, lifecycle: LifecycleManager) -> RunReport {
    RunReport {
        outcome,
        uptime: lifecycle.service_uptime(),
        history: lifecycle.history().to_vec(),
        encoding: EncodingMode::Inherited,
    }
}
