//! Platform helpers for plugin discovery
//!
//! - Home directory shorthand expansion (`~/plugins`)
//! - Executable detection (permission bits on Unix, extensions on Windows)
//! - Search path (`PATH`) resolution of bare filenames

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{PluginError, Result};

/// Extensions probed after the bare name on Windows, in order.
pub const WINDOWS_EXECUTABLE_EXTENSIONS: &[&str] = &[".bat", ".cmd", ".com", ".exe", ".ps1"];

/// Expand a leading `~` to the current user's home directory.
///
/// `~user/...` is rejected. Paths without a leading `~` are returned as-is.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    let first = match components.next() {
        Some(Component::Normal(first)) => first,
        _ => return Ok(path.to_path_buf()),
    };

    let first = first.to_string_lossy();
    if !first.starts_with('~') {
        return Ok(path.to_path_buf());
    }
    if first != "~" {
        return Err(PluginError::UserHomeExpansion {
            path: path.to_path_buf(),
        });
    }

    let home = dirs::home_dir().ok_or(PluginError::HomeNotFound)?;
    Ok(home.join(components.as_path()))
}

/// Directories of the process search path, read at call time.
pub fn search_path_dirs() -> Vec<PathBuf> {
    env::var_os("PATH")
        .map(|paths| {
            env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Check whether `path` is a regular file the current platform would execute.
pub fn is_executable(path: &Path) -> bool {
    let metadata = match path.metadata() {
        Ok(metadata) => metadata,
        Err(_) => return false,
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        has_executable_extension(path)
    }
}

/// Whether the file name ends with one of the Windows executable extensions.
pub fn has_executable_extension(path: &Path) -> bool {
    executable_extension(&path.to_string_lossy()).is_some()
}

/// Return the Windows executable extension `name` ends with, if any.
pub fn executable_extension(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    WINDOWS_EXECUTABLE_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| lower.ends_with(ext))
}

/// Strip a Windows executable extension from a file name.
///
/// Only applies on Windows; elsewhere file names are taken verbatim.
pub fn strip_executable_extension(name: &str) -> &str {
    if !cfg!(windows) {
        return name;
    }
    match executable_extension(name) {
        Some(ext) => &name[..name.len() - ext.len()],
        None => name,
    }
}

/// Resolve a bare file name against a list of search directories.
///
/// The first executable hit wins. On Windows each executable extension is
/// tried as well.
pub fn find_in_search_path(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    for dir in dirs {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }

        if cfg!(windows) {
            for ext in WINDOWS_EXECUTABLE_EXTENSIONS {
                let candidate = dir.join(format!("{}{}", name, ext));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}
