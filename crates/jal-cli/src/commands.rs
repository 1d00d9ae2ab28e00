// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations shared by the subcommands.

use anyhow::{Context, Result};
use jal_config::{ConfigWarning, LauncherConfig, discover_config, load_config, validate_config};
use schemars::schema_for;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config <FILE>`.
    Flag(PathBuf),
    /// `launcher.toml` found in home.
    Home(PathBuf),
    /// No file; built-in defaults.
    Defaults,
}

impl ConfigSource {
    fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Home(p) => Some(p),
            Self::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Home(p) => write!(f, "{}", p.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// A validated configuration plus what the validator had to say about it.
#[derive(Debug)]
pub struct EffectiveConfig {
    pub config: LauncherConfig,
    pub source: ConfigSource,
    pub warnings: Vec<ConfigWarning>,
}

/// Load `--config` if given, else `launcher.toml` from home, else defaults.
/// Environment overrides are applied and the result validated.
pub fn load_effective_config(home: &Path, explicit: Option<&Path>) -> Result<EffectiveConfig> {
    let source = match explicit {
        Some(p) => ConfigSource::Flag(p.to_path_buf()),
        None => match discover_config(home) {
            Some(p) => ConfigSource::Home(p),
            None => ConfigSource::Defaults,
        },
    };

    let config = load_config(source.path())
        .with_context(|| format!("load configuration from {source}"))?;
    let warnings = validate_config(&config).context("validate configuration")?;

    Ok(EffectiveConfig {
        config,
        source,
        warnings,
    })
}

/// Pretty JSON schema for [`LauncherConfig`].
pub fn schema_json() -> Result<String> {
    let value = serde_json::to_value(schema_for!(LauncherConfig))?;
    serde_json::to_string_pretty(&value).context("serialize schema")
}
