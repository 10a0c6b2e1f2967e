//! Plugin abstraction
//!
//! A plugin is anything addressable by a command path (`service log`):
//! either an executable found on disk or a handler compiled into the host.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use crate::error::{PluginError, Result};
use crate::platform;

/// Argument passed to external plugins to ask for their description
pub const PLUGIN_INFO_FLAG: &str = "--plugin-info";

/// Common capability set of all plugins
pub trait Plugin: Send + Sync {
    /// Space-joined command parts, e.g. `service log`
    fn name(&self) -> String {
        self.command_parts().join(" ")
    }

    /// Ordered command tokens this plugin answers to
    fn command_parts(&self) -> &[String];

    /// Short human readable description
    fn description(&self) -> Result<String>;

    /// Run the plugin with the residual arguments
    fn execute(&self, args: &[OsString]) -> Result<()>;

    /// Backing executable, if any
    fn path(&self) -> Option<&Path> {
        None
    }
}

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name())
            .field("path", &self.path())
            .finish()
    }
}

// ============================================================================
// External plugins
// ============================================================================

/// Plugin backed by an executable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalPlugin {
    path: PathBuf,
    parts: Vec<String>,
}

impl ExternalPlugin {
    /// Build a plugin from an executable path, deriving the command parts
    /// from its file name.
    ///
    /// Returns `None` if the file name does not start with `<prefix>-`.
    pub fn from_path(path: PathBuf, prefix: &str) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let parts = command_parts_from_file_name(&file_name, prefix)?;
        Some(Self { path, parts })
    }

    /// Run the executable with `args` and return what it wrote to stdout.
    pub fn output<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| PluginError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PluginError::PluginExit {
                name: self.name(),
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn probe_description(&self) -> Option<String> {
        match self.output([PLUGIN_INFO_FLAG]) {
            Ok(out) => parse_description(&out),
            Err(e) => {
                debug!(plugin = %self.path.display(), error = %e, "description probe failed");
                None
            }
        }
    }
}

impl Plugin for ExternalPlugin {
    fn command_parts(&self) -> &[String] {
        &self.parts
    }

    /// Asks the plugin via `--plugin-info`; falls back to the plugin path.
    fn description(&self) -> Result<String> {
        Ok(self
            .probe_description()
            .unwrap_or_else(|| self.path.display().to_string()))
    }

    fn execute(&self, args: &[OsString]) -> Result<()> {
        debug!(plugin = %self.path.display(), ?args, "running plugin");
        let status = Command::new(&self.path)
            .args(args)
            .status()
            .map_err(|source| PluginError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PluginError::PluginExit {
                name: self.name(),
                code: status.code(),
            });
        }
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Split `<prefix>-word1-word2_x` into `["word1", "word2-x"]`.
///
/// Underscores inside a segment are shown as hyphens. Windows executable
/// extensions are dropped first.
pub fn command_parts_from_file_name(file_name: &str, prefix: &str) -> Option<Vec<String>> {
    let stem = platform::strip_executable_extension(file_name);
    let rest = stem.strip_prefix(prefix)?.strip_prefix('-')?;
    if rest.is_empty() {
        return None;
    }

    Some(rest.split('-').map(|part| part.replace('_', "-")).collect())
}

/// Extract the `description:` line of a `--plugin-info` answer.
fn parse_description(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("description") {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

// ============================================================================
// Internal plugins
// ============================================================================

type Handler = dyn Fn(&[OsString]) -> Result<()> + Send + Sync;

/// Plugin compiled into the host and executed in-process
pub struct InternalPlugin {
    parts: Vec<String>,
    description: String,
    handler: Box<Handler>,
}

impl InternalPlugin {
    pub fn new<I, S, F>(parts: I, description: impl Into<String>, handler: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[OsString]) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
            description: description.into(),
            handler: Box::new(handler),
        }
    }
}

impl fmt::Debug for InternalPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalPlugin")
            .field("parts", &self.parts)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Plugin for InternalPlugin {
    fn command_parts(&self) -> &[String] {
        &self.parts
    }

    fn description(&self) -> Result<String> {
        Ok(self.description.clone())
    }

    fn execute(&self, args: &[OsString]) -> Result<()> {
        (self.handler)(args)
    }
}

// ============================================================================
// PluginList
// ============================================================================

/// Ordered collection of plugins
#[derive(Clone, Default)]
pub struct PluginList(Vec<Arc<dyn Plugin>>);

impl PluginList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, plugin: Arc<dyn Plugin>) {
        self.0.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn Plugin>> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn Plugin>> {
        self.0.iter()
    }

    /// Sort by name, case-sensitive ascending.
    pub fn sort_by_name(&mut self) {
        self.0.sort_by_cached_key(|p| p.name());
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|p| p.name()).collect()
    }

    /// Plugins nested strictly below `group` (more parts, same leading parts).
    pub fn nested_under(&self, group: &[String]) -> Self {
        if group.is_empty() {
            return Self::new();
        }
        self.0
            .iter()
            .filter(|p| {
                let parts = p.command_parts();
                parts.len() > group.len() && parts.starts_with(group)
            })
            .cloned()
            .collect()
    }
}

impl fmt::Debug for PluginList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl FromIterator<Arc<dyn Plugin>> for PluginList {
    fn from_iter<T: IntoIterator<Item = Arc<dyn Plugin>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Arc<dyn Plugin>> for PluginList {
    fn extend<T: IntoIterator<Item = Arc<dyn Plugin>>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for PluginList {
    type Item = Arc<dyn Plugin>;
    type IntoIter = std::vec::IntoIter<Arc<dyn Plugin>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PluginList {
    type Item = &'a Arc<dyn Plugin>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn Plugin>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
