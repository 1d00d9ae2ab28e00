// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snapshot tests for the operator-facing failure diagnostic.

use insta::assert_snapshot;
use jal_console::Diagnostic;
use jal_core::Termination;
use std::time::Duration;

#[test]
fn crash_diagnostic() {
    let diag = Diagnostic::new("streamlit run app.py", Termination::Exited { code: 1 })
        .with_home("/opt/jamovi-assistant")
        .with_uptime(Some(Duration::from_secs(75)));
    assert_snapshot!(diag.to_string().trim_start(), @r"
    Jamovi Assistant stopped unexpectedly.
      service: streamlit run app.py
      status:  exit code 1
      home:    /opt/jamovi-assistant
      ran for: 1m 15s
    ");
}

#[test]
fn launch_failure_diagnostic() {
    let diag = Diagnostic::new(
        "streamlit run app.py",
        Termination::LaunchFailed {
            reason: "No such file or directory (os error 2)".into(),
        },
    )
    .with_headline("The assistant could not be started.");
    assert_snapshot!(diag.to_string().trim_start(), @r"
    The assistant could not be started.
      service: streamlit run app.py
      status:  failed to start: No such file or directory (os error 2)
    ");
}

#[test]
fn diagnostic_starts_on_a_fresh_line() {
    let diag = Diagnostic::new("x", Termination::Signalled { signal: Some(9) });
    assert!(diag.to_string().starts_with('\n'));
}
