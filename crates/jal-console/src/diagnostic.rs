// SPDX-License-Identifier: MIT OR Apache-2.0
//! Failure diagnostic shown to the operator.

use jal_core::Termination;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Headline used when the configuration does not supply one.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Jamovi Assistant stopped unexpectedly.";

/// Everything the operator is told about an abnormal termination.
///
/// Only the raw termination status is reported; nothing from the service's
/// own output is parsed.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// First line of the diagnostic.
    pub headline: String,
    /// The service command line as launched.
    pub service: String,
    /// How the service ended.
    pub termination: Termination,
    /// Directory the service was launched from.
    pub home: Option<PathBuf>,
    /// How long the service ran, if it started at all.
    pub uptime: Option<Duration>,
}

impl Diagnostic {
    /// Diagnostic with the default headline and no optional details.
    pub fn new(service: impl Into<String>, termination: Termination) -> Self {
        Self {
            headline: DEFAULT_FAILURE_MESSAGE.into(),
            service: service.into(),
            termination,
            home: None,
            uptime: None,
        }
    }

    /// Replace the headline.
    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    /// Record the launch directory.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Record how long the service ran.
    pub fn with_uptime(mut self, uptime: Option<Duration>) -> Self {
        self.uptime = uptime;
        self
    }

    /// Write the diagnostic, followed by a blank line, and flush.
    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{self}")?;
        out.flush()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.headline)?;
        writeln!(f, "  service: {}", self.service)?;
        write!(f, "  status:  {}", self.termination)?;
        if let Some(ref home) = self.home {
            write!(f, "\n  home:    {}", home.display())?;
        }
        if let Some(uptime) = self.uptime {
            write!(f, "\n  ran for: {}", format_uptime(uptime))?;
        }
        Ok(())
    }
}

fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        0 => format!("{}ms", d.as_millis()),
        1..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m {}s", secs / 60, secs % 60),
        _ => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
    }
}
