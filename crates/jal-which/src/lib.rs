// SPDX-License-Identifier: MIT OR Apache-2.0
//! Microcrate for locating the service executable.
//!
//! Commands that look like paths (`./venv/bin/streamlit`, `tools/run.cmd`)
//! are resolved against a base directory. Bare names are searched for in
//! `PATH`, honouring the usual Windows launcher extensions.

use std::path::{Path, PathBuf};

/// Extensions tried after the bare name on Windows.
const WINDOWS_EXTENSIONS: [&str; 4] = [".exe", ".cmd", ".bat", ".com"];

/// Locate an executable by name, similarly to shell `which`.
///
/// If `bin` contains path separators it is treated as a direct path,
/// relative to the current directory.
pub fn which(bin: &str) -> Option<PathBuf> {
    let candidate = Path::new(bin);
    if has_path(candidate) {
        return with_extensions(candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| with_extensions(dir.join(bin)))
}

/// Locate `bin` the way the supervisor will launch it from `base`.
///
/// Path-like commands are joined onto `base` (absolute paths are kept as
/// they are); bare names fall back to [`which`].
pub fn which_in(base: &Path, bin: &str) -> Option<PathBuf> {
    let candidate = Path::new(bin);
    if has_path(candidate) || candidate.is_absolute() {
        return with_extensions(base.join(candidate));
    }
    which(bin)
}

fn has_path(candidate: &Path) -> bool {
    candidate.components().count() > 1
}

fn with_extensions(direct: PathBuf) -> Option<PathBuf> {
    if direct.is_file() {
        return Some(direct);
    }

    if !cfg!(windows) {
        return None;
    }

    WINDOWS_EXTENSIONS
        .into_iter()
        .map(|ext| {
            let mut name = direct.clone().into_os_string();
            name.push(ext);
            PathBuf::from(name)
        })
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_command_resolves_against_base() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("bin")).unwrap();
        let script = tmp.path().join("bin").join("serve");
        std::fs::write(&script, "").unwrap();

        assert_eq!(which_in(tmp.path(), "bin/serve"), Some(script));
        assert_eq!(which_in(tmp.path(), "bin/missing"), None);
    }

    #[test]
    fn absolute_command_ignores_base() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("serve");
        std::fs::write(&script, "").unwrap();
        let other = tempfile::tempdir().unwrap();

        let found = which_in(other.path(), script.to_str().unwrap());
        assert_eq!(found, Some(script));
    }

    #[test]
    fn unknown_bare_name_falls_through_to_path() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(which_in(tmp.path(), "no-such-binary-jal"), None);
        assert_eq!(which("no-such-binary-jal"), None);
    }

    #[test]
    fn directories_are_not_executables() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("bin").join("serve")).unwrap();
        assert_eq!(which_in(tmp.path(), "bin/serve"), None);
    }
}
