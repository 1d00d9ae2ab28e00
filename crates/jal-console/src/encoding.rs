// SPDX-License-Identifier: MIT OR Apache-2.0
//! One-time console encoding setup.

use jal_error::{ErrorCode, LauncherError};
use std::fmt;
use tracing::debug;

/// UTF-8 code page identifier.
pub const CP_UTF8: u32 = 65001;

/// Encoding the console ended up in after [`init_encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// The console was switched to UTF-8.
    Utf8,
    /// The console was left as the platform configured it.
    Inherited,
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("utf-8"),
            Self::Inherited => f.write_str("inherited"),
        }
    }
}

/// Switch the process console to UTF-8 before any output is written.
///
/// The setting is process-wide and reverts when the console closes; the
/// service inherits it. There is no teardown. With `enabled == false` the
/// console is left untouched.
///
/// Outside Windows, terminals take their encoding from the locale and
/// there is nothing to switch, so the result is [`EncodingMode::Inherited`].
pub fn init_encoding(enabled: bool) -> Result<EncodingMode, LauncherError> {
    if !enabled {
        debug!(target: "jal.console", "utf-8 console disabled by configuration");
        return Ok(EncodingMode::Inherited);
    }
    platform::set_utf8()
}

#[cfg(windows)]
#[allow(unsafe_code)]
mod platform {
    use super::{CP_UTF8, EncodingMode};
    use jal_error::LauncherError;
    use tracing::debug;
    use windows::Win32::System::Console::{GetConsoleOutputCP, SetConsoleCP, SetConsoleOutputCP};

    pub(super) fn set_utf8() -> Result<EncodingMode, LauncherError> {
        // SAFETY: plain Win32 calls taking a code page id; no pointers involved.
        let previous = unsafe { GetConsoleOutputCP() };
        unsafe { SetConsoleOutputCP(CP_UTF8) }.map_err(|e| {
            super::encoding_error(previous).with_context("os_error", e.to_string())
        })?;
        unsafe { SetConsoleCP(CP_UTF8) }.map_err(|e| {
            super::encoding_error(previous).with_context("os_error", e.to_string())
        })?;
        debug!(target: "jal.console", previous, "console code page set to utf-8");
        Ok(EncodingMode::Utf8)
    }
}

#[cfg(not(windows))]
mod platform {
    use super::EncodingMode;
    use jal_error::LauncherError;
    use tracing::debug;

    pub(super) fn set_utf8() -> Result<EncodingMode, LauncherError> {
        debug!(target: "jal.console", "console encoding follows the terminal locale");
        Ok(EncodingMode::Inherited)
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
fn encoding_error(previous: u32) -> LauncherError {
    LauncherError::new(
        ErrorCode::ConsoleEncodingFailed,
        "could not switch the console to UTF-8",
    )
    .with_context("previous_code_page", previous)
}
