// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operator acknowledgment.

use std::io::{self, BufRead, Write};
use tracing::debug;

/// Prompt shown before waiting for the operator.
pub const DEFAULT_PROMPT: &str = "Press Enter to close this window...";

/// Blocks until the operator has seen the failure diagnostic.
pub trait Acknowledge: Send {
    /// Show `prompt` and wait. Returns whether the operator actually
    /// responded (as opposed to the input being closed).
    fn acknowledge(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Waits for one line of input.
///
/// End of input counts as acknowledgment so a detached stdin cannot hang
/// the launcher forever.
pub struct LineAcknowledger<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead + Send, W: Write + Send> LineAcknowledger<R, W> {
    /// Acknowledger over arbitrary input and output streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Recover the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl LineAcknowledger<io::BufReader<io::Stdin>, io::Stderr> {
    /// Acknowledger reading stdin and prompting on stderr.
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead + Send, W: Write + Send> Acknowledge for LineAcknowledger<R, W> {
    fn acknowledge(&mut self, prompt: &str) -> io::Result<bool> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        let n = self.input.read_line(&mut line)?;
        if n == 0 {
            // Keep the shell prompt off the end of ours.
            writeln!(self.output)?;
            debug!(target: "jal.console", "input closed while waiting for acknowledgment");
            return Ok(false);
        }
        Ok(true)
    }
}

/// Never waits; used when `pause_on_failure` is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPause;

impl Acknowledge for NoPause {
    fn acknowledge(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(false)
    }
}
