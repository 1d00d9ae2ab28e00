// SPDX-License-Identifier: MIT OR Apache-2.0
//! Service process specification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What the supervisor launches: command, leading args, entry point and env.
///
/// The final argument vector is `args` followed by `entry_point` (when set),
/// so `streamlit` + `["run"]` + `app.py` runs `streamlit run app.py`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Executable command to run; bare names go through `PATH`.
    pub command: String,
    /// Arguments placed before the entry point.
    #[serde(default)]
    pub args: Vec<String>,
    /// Script or module the command is pointed at, relative to home.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    /// Additional environment variables for the service.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ServiceSpec {
    /// Create a spec with the given command and default (empty) args/env.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            entry_point: None,
            env: BTreeMap::new(),
        }
    }

    /// Builder-style setter for the leading arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style setter for the entry point.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    /// Builder-style setter for a single environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The full argument vector handed to the process.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.extend(self.entry_point.iter().cloned());
        argv
    }
}

impl Default for ServiceSpec {
    fn default() -> Self {
        Self::new("streamlit")
            .with_args(["run"])
            .with_entry_point("app.py")
            .with_env("PYTHONIOENCODING", "utf-8")
    }
}

impl fmt::Display for ServiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for arg in self.argv() {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
