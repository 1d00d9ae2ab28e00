// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preflight checks: report what a launch would find, without launching.

use jal_core::ServiceSpec;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Secrets file the assistant reads its API key from, relative to home.
pub const SECRETS_FILE: &str = ".streamlit/secrets.toml";

/// Result of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Found.
    Ok,
    /// Missing, but the launch can still go ahead.
    Warn,
    /// Missing; the launch would fail.
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.pad("ok"),
            Self::Warn => f.pad("warn"),
            Self::Fail => f.pad("FAIL"),
        }
    }
}

/// One line of the preflight report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckItem {
    /// What was checked.
    pub name: &'static str,
    /// Outcome.
    pub status: CheckStatus,
    /// Path found, or what was looked for.
    pub detail: String,
}

/// Everything `check` found.
#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    /// Home directory the checks ran against.
    pub home: PathBuf,
    /// Individual checks, in the order they ran.
    pub items: Vec<CheckItem>,
}

impl PreflightReport {
    /// `true` when nothing failed.
    pub fn is_ok(&self) -> bool {
        self.items.iter().all(|i| i.status != CheckStatus::Fail)
    }

    /// Look up a check by name.
    pub fn item(&self, name: &str) -> Option<&CheckItem> {
        self.items.iter().find(|i| i.name == name)
    }
}

impl fmt::Display for PreflightReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "home: {}", self.home.display())?;
        for item in &self.items {
            writeln!(f, "[{:>4}] {:<12} {}", item.status, item.name, item.detail)?;
        }
        Ok(())
    }
}

/// Check that the service command and entry point resolve from `home`, and
/// whether the assistant's secrets file is present.
pub fn preflight(home: &Path, spec: &ServiceSpec) -> PreflightReport {
    let mut items = Vec::new();

    items.push(match jal_which::which_in(home, &spec.command) {
        Some(path) => CheckItem {
            name: "command",
            status: CheckStatus::Ok,
            detail: path.display().to_string(),
        },
        None => CheckItem {
            name: "command",
            status: CheckStatus::Fail,
            detail: format!("'{}' not found in home or PATH", spec.command),
        },
    });

    if let Some(ref entry) = spec.entry_point {
        let path = home.join(entry);
        items.push(if path.is_file() {
            CheckItem {
                name: "entry point",
                status: CheckStatus::Ok,
                detail: path.display().to_string(),
            }
        } else {
            CheckItem {
                name: "entry point",
                status: CheckStatus::Fail,
                detail: format!("{} does not exist", path.display()),
            }
        });
    }

    let secrets = home.join(SECRETS_FILE);
    items.push(if secrets.is_file() {
        CheckItem {
            name: "secrets",
            status: CheckStatus::Ok,
            detail: secrets.display().to_string(),
        }
    } else {
        CheckItem {
            name: "secrets",
            status: CheckStatus::Warn,
            detail: format!(
                "{} not found; the assistant will report a missing API key",
                secrets.display()
            ),
        }
    });

    PreflightReport {
        home: home.to_path_buf(),
        items,
    }
}
