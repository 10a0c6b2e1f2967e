//! Executable Locator
//!
//! Finds `<prefix>-<name>` executables in the plugin directory and,
//! optionally, on the search path. Misconfiguration (e.g. an unexpandable
//! plugin directory) reads as "not found".

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::platform;

/// Where to look for the search path directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchPath {
    /// Read `PATH` on every call
    #[default]
    Environment,
    /// Fixed list of directories
    Dirs(Vec<PathBuf>),
}

impl SearchPath {
    pub fn dirs(&self) -> Vec<PathBuf> {
        match self {
            Self::Environment => platform::search_path_dirs(),
            Self::Dirs(dirs) => dirs.clone(),
        }
    }
}

/// A prefixed executable found during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub prefix: String,
}

/// Executable Locator
#[derive(Debug, Clone)]
pub struct Locator {
    prefixes: Vec<String>,
    plugins_dir: PathBuf,
    lookup_in_path: bool,
    search_path: SearchPath,
}

impl Locator {
    pub fn new(
        prefixes: Vec<String>,
        plugins_dir: PathBuf,
        lookup_in_path: bool,
        search_path: SearchPath,
    ) -> Self {
        Self {
            prefixes,
            plugins_dir,
            lookup_in_path,
            search_path,
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    pub fn lookup_in_path(&self) -> bool {
        self.lookup_in_path
    }

    /// Expanded plugin directory, `None` if it cannot be expanded.
    pub fn expanded_plugins_dir(&self) -> Option<PathBuf> {
        match platform::expand_home(&self.plugins_dir) {
            Ok(dir) => Some(dir),
            Err(e) => {
                debug!(dir = %self.plugins_dir.display(), error = %e, "cannot expand plugin directory");
                None
            }
        }
    }

    /// Look up `<prefix>-<name>` for each prefix in order.
    ///
    /// The plugin directory is consulted before the search path.
    pub fn lookup(&self, name: &str) -> Option<PathBuf> {
        for prefix in &self.prefixes {
            let file_name = format!("{}-{}", prefix, name);

            let plugins_dir = self.expanded_plugins_dir()?;
            let candidate = plugins_dir.join(&file_name);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "plugin found in plugin directory");
                return Some(candidate);
            }

            if cfg!(windows) {
                for ext in platform::WINDOWS_EXECUTABLE_EXTENSIONS {
                    let with_ext = plugins_dir.join(format!("{}{}", file_name, ext));
                    if with_ext.is_file() {
                        return Some(with_ext);
                    }
                }
            }

            if self.lookup_in_path {
                if let Some(path) =
                    platform::find_in_search_path(&file_name, &self.search_path.dirs())
                {
                    debug!(path = %path.display(), "plugin found on search path");
                    return Some(path);
                }
            }
        }

        None
    }

    /// Every prefixed regular file in the plugin directory.
    pub fn scan_plugins_dir(&self) -> Vec<Candidate> {
        let Some(dir) = self.expanded_plugins_dir() else {
            return Vec::new();
        };
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "plugin directory does not exist");
            return Vec::new();
        }

        self.scan_dir(&dir, |path| path.is_file())
    }

    /// Every prefixed executable across the search path, or nothing when
    /// search path lookup is disabled.
    pub fn scan_search_path(&self) -> Vec<Candidate> {
        if !self.lookup_in_path {
            return Vec::new();
        }

        self.search_path
            .dirs()
            .iter()
            .filter(|dir| dir.is_dir())
            .flat_map(|dir| self.scan_dir(dir, platform::is_executable))
            .collect()
    }

    fn scan_dir(&self, dir: &Path, accept: impl Fn(&Path) -> bool) -> Vec<Candidate> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| accept(entry.path()))
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy();
                let prefix = self
                    .prefixes
                    .iter()
                    .find(|prefix| is_prefixed(&name, prefix))?;
                Some(Candidate {
                    path: entry.path().to_path_buf(),
                    prefix: prefix.clone(),
                })
            })
            .collect()
    }
}

fn is_prefixed(file_name: &str, prefix: &str) -> bool {
    file_name
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.len() > 1 && rest.starts_with('-'))
}
