// SPDX-License-Identifier: MIT OR Apache-2.0
//! How a supervised service ended, and what the launcher does about it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::ExitStatus;

/// Exit code the launcher reports when the service gave none of its own.
pub const FALLBACK_FAILURE_CODE: i32 = 1;

/// Termination status of one service run.
///
/// Produced exactly once, when the child exits or fails to start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// The process exited with an exit code.
    Exited {
        /// Exit code returned by the process.
        code: i32,
    },
    /// The process was terminated by a signal and reported no exit code.
    Signalled {
        /// Signal number, when the platform exposes one.
        signal: Option<i32>,
    },
    /// The process could not be started.
    LaunchFailed {
        /// OS error text from the spawn attempt.
        reason: String,
    },
    /// The process was started but its status could not be collected.
    Lost {
        /// OS error text from the wait.
        reason: String,
    },
}

impl Termination {
    /// Classify an OS exit status.
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::Exited { code },
            None => Self::Signalled {
                signal: signal_of(&status),
            },
        }
    }

    /// `true` only for an exit code of zero.
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Exited { code: 0 })
    }

    /// Exit code the launcher should mirror for this termination.
    pub fn launcher_exit_code(&self) -> i32 {
        match self {
            Self::Exited { code } => *code,
            Self::Signalled { .. } | Self::LaunchFailed { .. } | Self::Lost { .. } => {
                FALLBACK_FAILURE_CODE
            }
        }
    }
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &ExitStatus) -> Option<i32> {
    None
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited { code } => write!(f, "exit code {code}"),
            Self::Signalled { signal: Some(sig) } => write!(f, "terminated by signal {sig}"),
            Self::Signalled { signal: None } => f.write_str("terminated without an exit code"),
            Self::LaunchFailed { reason } => write!(f, "failed to start: {reason}"),
            Self::Lost { reason } => write!(f, "status unavailable: {reason}"),
        }
    }
}

/// Which terminal branch the supervisor took.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum Outcome {
    /// The service terminated normally; the launcher exits silently.
    Success,
    /// The service terminated abnormally; the operator was shown a
    /// diagnostic.
    Failure {
        /// The termination that triggered the branch.
        termination: Termination,
        /// Whether the operator acknowledged the diagnostic before exit.
        acknowledged: bool,
    },
}

impl Outcome {
    /// Launcher process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure { termination, .. } => termination.launcher_exit_code(),
        }
    }

    /// `true` when the failure branch was taken.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}
