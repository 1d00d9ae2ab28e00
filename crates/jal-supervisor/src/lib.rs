// SPDX-License-Identifier: MIT OR Apache-2.0
//! Launch-and-supervise lifecycle for the Jamovi Assistant service.
//!
//! [`Launcher::run`] is the whole operation: enter the home directory,
//! switch the console to UTF-8, start the service once and block until it
//! exits. A normal exit returns silently; anything else writes a diagnostic
//! and waits for the operator before returning.
//!
//! The process itself sits behind [`ProcessRunner`] so the lifecycle can be
//! exercised without spawning anything.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod home;
pub mod preflight;
mod runner;
mod supervisor;

pub use home::{HOME_ENV, Home, HomeSource, resolve_home};
pub use preflight::{CheckItem, CheckStatus, PreflightReport, preflight};
pub use runner::{ProcessRunner, TokioRunner};
pub use supervisor::{Launcher, OperatorIo, RunReport, Supervisor};
