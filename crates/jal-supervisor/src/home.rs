// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resolving and entering the launcher's home directory.

use jal_error::{ErrorCode, LauncherError};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that overrides the executable's directory.
pub const HOME_ENV: &str = "JAL_HOME";

/// Where the home directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeSource {
    /// `--home` on the command line.
    Flag,
    /// The `JAL_HOME` environment variable.
    Env,
    /// The directory containing the launcher executable.
    Executable,
}

impl fmt::Display for HomeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("--home"),
            Self::Env => f.write_str(HOME_ENV),
            Self::Executable => f.write_str("launcher location"),
        }
    }
}

/// The directory the service is located and launched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Home {
    path: PathBuf,
    source: HomeSource,
}

impl Home {
    /// Absolute path of the home directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the path came from.
    pub fn source(&self) -> HomeSource {
        self.source
    }

    /// Make home the process's current directory.
    ///
    /// Must happen before the service is launched so that relative
    /// references resolve no matter where the launcher was started from.
    pub fn enter(&self) -> Result<(), LauncherError> {
        std::env::set_current_dir(&self.path).map_err(|e| {
            LauncherError::new(ErrorCode::HomeEnterFailed, "cannot enter home directory")
                .with_context("home", self.path.display().to_string())
                .with_source(e)
        })?;
        debug!(target: "jal.supervisor", home = %self.path.display(), "entered home directory");
        Ok(())
    }
}

/// Resolve home: an explicit path first, then `JAL_HOME`, then the
/// directory holding the running executable.
///
/// The result is made absolute against the caller's directory. A path that
/// does not name an existing directory is an error.
pub fn resolve_home(explicit: Option<&Path>) -> Result<Home, LauncherError> {
    let (raw, source) = match explicit {
        Some(p) => (p.to_path_buf(), HomeSource::Flag),
        None => match std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(v) => (PathBuf::from(v), HomeSource::Env),
            None => (executable_dir()?, HomeSource::Executable),
        },
    };

    let path = std::path::absolute(&raw).map_err(|e| {
        LauncherError::new(ErrorCode::HomeUnresolved, "cannot make home path absolute")
            .with_context("home", raw.display().to_string())
            .with_source(e)
    })?;

    if !path.is_dir() {
        return Err(
            LauncherError::new(ErrorCode::HomeNotFound, "home is not a directory")
                .with_context("home", path.display().to_string())
                .with_context("source", source),
        );
    }

    debug!(target: "jal.supervisor", home = %path.display(), %source, "resolved home");
    Ok(Home { path, source })
}

fn executable_dir() -> Result<PathBuf, LauncherError> {
    let exe = std::env::current_exe().map_err(|e| {
        LauncherError::new(ErrorCode::HomeUnresolved, "cannot locate the launcher executable")
            .with_source(e)
    })?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        LauncherError::new(
            ErrorCode::HomeUnresolved,
            "launcher executable has no parent directory",
        )
        .with_context("exe", exe.display().to_string())
    })
}
