// SPDX-License-Identifier: MIT OR Apache-2.0
//! `JAL_*` environment override tests.
//!
//! Env vars are process-global, so every test here runs serially.

use jal_config::{
    ConfigError, LauncherConfig, apply_env_overrides, load_config, parse_toml,
    utf8_console_from_env,
};
use serial_test::serial;
use std::ffi::OsString;

/// Sets env vars for the duration of a test and puts the old values back on drop.
struct EnvGuard {
    saved: Vec<(&'static str, Option<OsString>)>,
}

impl EnvGuard {
    fn new(pairs: &[(&'static str, &str)]) -> Self {
        let saved = pairs.iter().map(|(k, _)| (*k, std::env::var_os(k))).collect();
        for (k, v) in pairs {
            // SAFETY: tests in this file are #[serial].
            unsafe { std::env::set_var(k, v) };
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, previous) in &self.saved {
            // SAFETY: restoring env to previous state on drop.
            unsafe {
                match previous {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
        }
    }
}

#[test]
#[serial]
fn no_env_leaves_defaults() {
    let cfg = load_config(None).unwrap();
    assert_eq!(cfg, LauncherConfig::default());
}

#[test]
#[serial]
fn log_level_override() {
    let _g = EnvGuard::new(&[("JAL_LOG_LEVEL", "debug")]);
    let cfg = load_config(None).unwrap();
    assert_eq!(cfg.log_level(), "debug");
}

#[test]
#[serial]
fn service_command_override_keeps_args() {
    let _g = EnvGuard::new(&[("JAL_SERVICE_COMMAND", "./venv/bin/streamlit")]);
    let cfg = load_config(None).unwrap();
    let spec = cfg.service_spec();
    assert_eq!(spec.command, "./venv/bin/streamlit");
    assert_eq!(spec.argv(), vec!["run", "app.py"]);
}

#[test]
#[serial]
fn service_command_override_creates_missing_table() {
    let _g = EnvGuard::new(&[("JAL_SERVICE_COMMAND", "serve")]);
    let mut cfg = parse_toml("").unwrap();
    apply_env_overrides(&mut cfg).unwrap();
    assert_eq!(cfg.service.unwrap().command, "serve");
}

#[test]
#[serial]
fn boolean_overrides() {
    let _g = EnvGuard::new(&[("JAL_PAUSE_ON_FAILURE", "0"), ("JAL_UTF8_CONSOLE", "false")]);
    let cfg = load_config(None).unwrap();
    assert!(!cfg.pause_on_failure());
    assert!(!cfg.utf8_console());
}

#[test]
#[serial]
fn env_beats_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("launcher.toml");
    std::fs::write(&path, "pause_on_failure = false\nlog_level = \"info\"").unwrap();
    let _g = EnvGuard::new(&[("JAL_PAUSE_ON_FAILURE", "yes")]);
    let cfg = load_config(Some(&path)).unwrap();
    assert!(cfg.pause_on_failure());
    assert_eq!(cfg.log_level(), "info");
}

#[test]
#[serial]
fn malformed_boolean_is_an_error() {
    let _g = EnvGuard::new(&[("JAL_UTF8_CONSOLE", "sometimes")]);
    let err = load_config(None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == "JAL_UTF8_CONSOLE"));
}

#[test]
#[serial]
fn utf8_switch_without_config_follows_env() {
    let _g = EnvGuard::new(&[("JAL_UTF8_CONSOLE", "0")]);
    assert!(!utf8_console_from_env());
    let _g = EnvGuard::new(&[("JAL_UTF8_CONSOLE", "sometimes")]);
    assert!(utf8_console_from_env());
}

#[test]
#[serial]
fn guard_puts_back_an_existing_value() {
    let _outer = EnvGuard::new(&[("JAL_LOG_LEVEL", "info")]);
    {
        let _inner = EnvGuard::new(&[("JAL_LOG_LEVEL", "trace")]);
        assert_eq!(std::env::var("JAL_LOG_LEVEL").unwrap(), "trace");
    }
    assert_eq!(std::env::var("JAL_LOG_LEVEL").unwrap(), "info");
}
