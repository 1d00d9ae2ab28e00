// SPDX-License-Identifier: MIT OR Apache-2.0
//! Console side of the launcher: encoding setup at start, and on failure a
//! diagnostic plus a blocking wait for the operator.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod ack;
mod diagnostic;
mod encoding;

pub use ack::{Acknowledge, DEFAULT_PROMPT, LineAcknowledger, NoPause};
pub use diagnostic::{DEFAULT_FAILURE_MESSAGE, Diagnostic};
pub use encoding::{CP_UTF8, EncodingMode, init_encoding};
