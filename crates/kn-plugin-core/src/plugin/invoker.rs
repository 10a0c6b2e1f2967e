//! Process Invoker
//!
//! Hands control over to a resolved plugin executable.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{PluginError, Result};

/// Runs a plugin executable on behalf of the host.
pub trait Invoker {
    /// Execute `path` with `argv` (`argv[0]` is the program name) and `env`.
    ///
    /// Implementations that replace the current process only ever return
    /// an error.
    fn execute(&self, path: &Path, argv: &[OsString], env: &[(OsString, OsString)]) -> Result<()>;
}

/// Replaces the current process on Unix; elsewhere runs the plugin as a
/// child with inherited stdio and exits with its status.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl ProcessInvoker {
    pub fn new() -> Self {
        Self
    }
}

impl Invoker for ProcessInvoker {
    #[cfg(unix)]
    fn execute(&self, path: &Path, argv: &[OsString], env: &[(OsString, OsString)]) -> Result<()> {
        use std::os::unix::process::CommandExt;

        debug!(plugin = %path.display(), ?argv, "replacing process with plugin");
        let mut cmd = Command::new(path);
        if let Some((arg0, args)) = argv.split_first() {
            cmd.arg0(arg0).args(args);
        }
        let source = cmd.env_clear().envs(env.iter().cloned()).exec();

        Err(PluginError::Spawn {
            path: path.to_path_buf(),
            source,
        })
    }

    #[cfg(not(unix))]
    fn execute(&self, path: &Path, argv: &[OsString], env: &[(OsString, OsString)]) -> Result<()> {
        debug!(plugin = %path.display(), ?argv, "running plugin as child process");
        let status = Command::new(path)
            .args(argv.iter().skip(1))
            .env_clear()
            .envs(env.iter().cloned())
            .status()
            .map_err(|source| PluginError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        if status.success() {
            std::process::exit(0);
        }

        Err(PluginError::PluginExit {
            name: path.display().to_string(),
            code: status.code(),
        })
    }
}

/// Current process environment as key/value pairs, byte for byte
pub fn current_env() -> Vec<(OsString, OsString)> {
    std::env::vars_os().collect()
}
