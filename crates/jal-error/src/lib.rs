// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy with stable error codes for the Jamovi Assistant launcher.
//!
//! Every launcher error carries an [`ErrorCode`] (a machine-readable, stable
//! string tag), a human-readable message, an optional cause and arbitrary
//! key-value context. Use the builder returned by [`LauncherError::new`] to
//! construct errors fluently.
//!
//! These errors describe failures of the launcher itself. Abnormal
//! termination of the supervised service is not an error in this sense; it is
//! an outcome, reported through the failure branch of the supervisor.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Home --
    /// The launcher could not determine its own location.
    HomeUnresolved,
    /// The resolved home directory does not exist or is not a directory.
    HomeNotFound,
    /// Changing the working directory to home failed.
    HomeEnterFailed,

    // -- Console --
    /// The console code page could not be switched.
    ConsoleEncodingFailed,

    // -- Lifecycle --
    /// A lifecycle transition was attempted that the state machine forbids.
    LifecycleInvalidTransition,
}

impl ErrorCode {
    /// Stable `&'static str` representation of the code (e.g.
    /// `"HOME_NOT_FOUND"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomeUnresolved => "HOME_UNRESOLVED",
            Self::HomeNotFound => "HOME_NOT_FOUND",
            Self::HomeEnterFailed => "HOME_ENTER_FAILED",
            Self::ConsoleEncodingFailed => "CONSOLE_ENCODING_FAILED",
            Self::LifecycleInvalidTransition => "LIFECYCLE_INVALID_TRANSITION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LauncherError
// ---------------------------------------------------------------------------

/// Unified launcher error.
///
/// # Builder usage
///
/// ```
/// use jal_error::{ErrorCode, LauncherError};
///
/// let err = LauncherError::new(ErrorCode::HomeNotFound, "home directory is missing")
///     .with_context("home", "/opt/jamovi-assistant");
/// assert_eq!(err.code, ErrorCode::HomeNotFound);
/// ```
pub struct LauncherError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl LauncherError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// Values that fail to serialise are skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Debug for LauncherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("LauncherError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for LauncherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if !self.context.is_empty()
            && let Ok(ctx) = serde_json::to_string(&self.context)
        {
            write!(f, " {ctx}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LauncherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
