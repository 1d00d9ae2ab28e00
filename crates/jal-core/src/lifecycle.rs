// SPDX-License-Identifier: MIT OR Apache-2.0
//! Supervision state machine: tracks and enforces valid state transitions.
//!
//! ```text
//! Init ──► Running ──► SuccessExit
//!              │
//!              └─────► FailureWait ──► FailureExit
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Lifecycle state of one supervised run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Directory and encoding setup.
    Init,
    /// The service is running and the supervisor is blocked on it.
    Running,
    /// The service ended normally; terminal.
    SuccessExit,
    /// The service ended abnormally; waiting for the operator.
    FailureWait,
    /// The operator acknowledged the failure; terminal.
    FailureExit,
}

impl LifecycleState {
    /// `true` for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SuccessExit | Self::FailureExit)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Running => "running",
            Self::SuccessExit => "success_exit",
            Self::FailureWait => "failure_wait",
            Self::FailureExit => "failure_exit",
        };
        f.write_str(s)
    }
}

/// Record of a single lifecycle state transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LifecycleTransition {
    /// State before the transition.
    pub from: LifecycleState,
    /// State after the transition.
    pub to: LifecycleState,
    /// RFC 3339 timestamp of when the transition occurred.
    pub timestamp: String,
    /// Optional human-readable reason for the transition.
    pub reason: Option<String>,
}

/// Errors produced by [`LifecycleManager`] when a transition is invalid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The requested transition is not allowed by the state machine.
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: LifecycleState,
        /// Requested target state.
        to: LifecycleState,
    },
    /// The manager is already in the requested state.
    #[error("already in state {0}")]
    AlreadyInState(LifecycleState),
}

/// Tracks one run through the state machine and records its history.
#[derive(Debug)]
pub struct LifecycleManager {
    state: LifecycleState,
    history: Vec<LifecycleTransition>,
    running_since: Option<Instant>,
    running_for: Option<Duration>,
}

impl LifecycleManager {
    /// Create a new manager in the [`LifecycleState::Init`] state.
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Init,
            history: Vec::new(),
            running_since: None,
            running_for: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Attempt to transition to a new state.
    pub fn transition(
        &mut self,
        to: LifecycleState,
        reason: Option<String>,
    ) -> Result<(), LifecycleError> {
        if self.state == to {
            return Err(LifecycleError::AlreadyInState(to));
        }
        if !self.can_transition(to) {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        let from = self.state;
        self.state = to;

        match to {
            LifecycleState::Running => self.running_since = Some(Instant::now()),
            LifecycleState::SuccessExit | LifecycleState::FailureWait => {
                self.running_for = self.running_since.map(|t| t.elapsed());
            }
            _ => {}
        }

        self.history.push(LifecycleTransition {
            from,
            to,
            timestamp: chrono::Utc::now().to_rfc3339(),
            reason,
        });

        Ok(())
    }

    /// Returns `true` if transitioning from the current state to `to` is valid.
    pub fn can_transition(&self, to: LifecycleState) -> bool {
        matches!(
            (self.state, to),
            (LifecycleState::Init, LifecycleState::Running)
                | (LifecycleState::Running, LifecycleState::SuccessExit)
                | (LifecycleState::Running, LifecycleState::FailureWait)
                | (LifecycleState::FailureWait, LifecycleState::FailureExit)
        )
    }

    /// Full history of state transitions.
    pub fn history(&self) -> &[LifecycleTransition] {
        &self.history
    }

    /// How long the service ran.
    ///
    /// While running this is the time so far; after the service ended it is
    /// frozen. `None` if the service was never started.
    pub fn service_uptime(&self) -> Option<Duration> {
        self.running_for
            .or_else(|| self.running_since.map(|t| t.elapsed()))
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
