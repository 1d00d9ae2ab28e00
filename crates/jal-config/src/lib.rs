// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for the launcher.
//!
//! This crate provides [`LauncherConfig`], the launcher's runtime settings,
//! together with helpers for loading from TOML files, applying `JAL_*`
//! environment overrides, merging overlays, and producing advisory
//! [`ConfigWarning`]s.
//!
//! A file only needs to name the settings it changes: [`load_config`] lays
//! the parsed file over [`LauncherConfig::default()`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

use jal_core::ServiceSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file exists but could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// An environment override carried a value of the wrong shape.
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// Raw value found in the environment.
        value: String,
        /// What was expected.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Failures will not pause the console.
    PauseDisabled,
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::PauseDisabled => f.write_str(
                "pause_on_failure is off: a failure diagnostic may vanish with the console window",
            ),
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level runtime configuration for the launcher.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Log level for launcher diagnostics (e.g. `"warn"`, `"debug"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Switch the console to UTF-8 before launching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utf8_console: Option<bool>,

    /// Wait for the operator after an abnormal termination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_on_failure: Option<bool>,

    /// Line printed on stdout before the service starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    /// Headline of the failure diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,

    /// The service to launch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceEntry>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            utf8_console: Some(true),
            pause_on_failure: Some(true),
            banner: Some(DEFAULT_BANNER.into()),
            failure_message: None,
            service: Some(ServiceEntry::default()),
        }
    }
}

impl LauncherConfig {
    /// Effective UTF-8 console switch.
    pub fn utf8_console(&self) -> bool {
        self.utf8_console.unwrap_or(true)
    }

    /// Effective pause-on-failure switch.
    pub fn pause_on_failure(&self) -> bool {
        self.pause_on_failure.unwrap_or(true)
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// The service this configuration launches.
    pub fn service_spec(&self) -> ServiceSpec {
        self.service.clone().unwrap_or_default().into()
    }
}

/// The `[service]` table.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ServiceEntry {
    /// Command to spawn; path-like values are relative to the launcher home.
    pub command: String,
    /// Arguments placed before the entry point.
    #[serde(default)]
    pub args: Vec<String>,
    /// Script the command runs, relative to the launcher home.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    /// Extra environment variables for the service.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for ServiceEntry {
    fn default() -> Self {
        ServiceSpec::default().into()
    }
}

impl From<ServiceEntry> for ServiceSpec {
    fn from(e: ServiceEntry) -> Self {
        ServiceSpec {
            command: e.command,
            args: e.args,
            entry_point: e.entry_point,
            env: e.env,
        }
    }
}

impl From<ServiceSpec> for ServiceEntry {
    fn from(s: ServiceSpec) -> Self {
        ServiceEntry {
            command: s.command,
            args: s.args,
            entry_point: s.entry_point,
            env: s.env,
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// File name looked up in the launcher home.
pub const CONFIG_FILE_NAME: &str = "launcher.toml";

/// Banner printed before the service starts.
pub const DEFAULT_BANNER: &str = "Starting Jamovi Assistant...";

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`LauncherConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file and lays it over the
///   defaults.
/// * If `path` is `None`, returns [`LauncherConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<LauncherConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|e| read_error(p, e))?;
            merge_configs(LauncherConfig::default(), parse_toml(&content)?)
        }
        None => LauncherConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn read_error(path: &Path, e: std::io::Error) -> ConfigError {
    let path = path.display().to_string();
    match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound { path },
        _ => ConfigError::Io { path, source: e },
    }
}

/// Return `<home>/launcher.toml` when it exists.
pub fn discover_config(home: &Path) -> Option<PathBuf> {
    let candidate = home.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Parse a TOML string into a sparse [`LauncherConfig`].
///
/// Fields absent from the text stay `None`.
pub fn parse_toml(content: &str) -> Result<LauncherConfig, ConfigError> {
    toml::from_str::<LauncherConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

/// Render a configuration as TOML.
pub fn to_toml(config: &LauncherConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `JAL_LOG_LEVEL`
/// - `JAL_SERVICE_COMMAND`
/// - `JAL_PAUSE_ON_FAILURE` (`true`/`false`/`1`/`0`)
/// - `JAL_UTF8_CONSOLE` (`true`/`false`/`1`/`0`)
pub fn apply_env_overrides(config: &mut LauncherConfig) -> Result<(), ConfigError> {
    if let Ok(val) = std::env::var("JAL_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Ok(val) = std::env::var("JAL_SERVICE_COMMAND") {
        config.service.get_or_insert_with(ServiceEntry::default).command = val;
    }
    if let Ok(val) = std::env::var("JAL_PAUSE_ON_FAILURE") {
        config.pause_on_failure = Some(parse_flag("JAL_PAUSE_ON_FAILURE", &val)?);
    }
    if let Ok(val) = std::env::var("JAL_UTF8_CONSOLE") {
        config.utf8_console = Some(parse_flag("JAL_UTF8_CONSOLE", &val)?);
    }
    Ok(())
}

/// Whether to switch the console to UTF-8 before a configuration has been
/// loaded: `JAL_UTF8_CONSOLE` when it parses, otherwise on.
pub fn utf8_console_from_env() -> bool {
    utf8_flag_or_default(std::env::var("JAL_UTF8_CONSOLE").ok().as_deref())
}

fn utf8_flag_or_default(value: Option<&str>) -> bool {
    value
        .and_then(|v| parse_flag("JAL_UTF8_CONSOLE", v).ok())
        .unwrap_or(true)
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var: var.into(),
            value: value.into(),
            reason: "expected true/false/1/0".into(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a configuration, returning advisory warnings.
///
/// Hard errors (empty command, unknown log level, an entry point that
/// escapes the home directory) are returned as a
/// [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &LauncherConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    if let Some(ref service) = config.service {
        if service.command.trim().is_empty() {
            errors.push("service command must not be empty".into());
        }
        match service.entry_point.as_deref() {
            Some(ep) if ep.trim().is_empty() => {
                errors.push("service entry_point must not be empty".into());
            }
            Some(ep) if Path::new(ep).is_absolute() => {
                errors.push(format!(
                    "service entry_point '{ep}' must be relative to the launcher home"
                ));
            }
            Some(_) => {}
            None => warnings.push(ConfigWarning::MissingOptionalField {
                field: "service.entry_point".into(),
                hint: "`check` cannot verify the service script exists".into(),
            }),
        }
        for key in service.env.keys() {
            if key.is_empty() || key.contains('=') {
                errors.push(format!("service env key '{key}' is not a valid variable name"));
            }
        }
    }

    if !config.pause_on_failure() {
        warnings.push(ConfigWarning::PauseDisabled);
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
///
/// The `[service]` table is replaced as a whole, never merged field by field,
/// so an overlay cannot pair its command with the base's arguments.
pub fn merge_configs(base: LauncherConfig, overlay: LauncherConfig) -> LauncherConfig {
    LauncherConfig {
        log_level: overlay.log_level.or(base.log_level),
        utf8_console: overlay.utf8_console.or(base.utf8_console),
        pause_on_failure: overlay.pause_on_failure.or(base.pause_on_failure),
        banner: overlay.banner.or(base.banner),
        failure_message: overlay.failure_message.or(base.failure_message),
        service: overlay.service.or(base.service),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
