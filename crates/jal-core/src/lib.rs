// SPDX-License-Identifier: MIT OR Apache-2.0
//! jal-core
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Domain types shared by the launcher crates: what to launch
//! ([`ServiceSpec`]), how it ended ([`Termination`], [`Outcome`]) and the
//! supervision state machine ([`lifecycle::LifecycleManager`]).

pub mod lifecycle;
mod spec;
mod termination;

pub use lifecycle::{LifecycleError, LifecycleManager, LifecycleState, LifecycleTransition};
pub use spec::ServiceSpec;
pub use termination::{Outcome, Termination};
