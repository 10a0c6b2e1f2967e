use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("unknown command \"{command}\" for \"{host}\"")]
    UnknownCommand { command: String, host: String },

    #[error("Failed to execute plugin {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin '{name}' exited with {}", exit_description(.code))]
    PluginExit { name: String, code: Option<i32> },

    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Config key not found: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("Cannot expand user-specific home directory in {path}")]
    UserHomeExpansion { path: PathBuf },

    #[error("Home directory not found")]
    HomeNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PluginError>;

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl PluginError {
    /// Exit code the host should terminate with.
    ///
    /// A failing plugin's own status is forwarded unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PluginExit {
                code: Some(code), ..
            } => *code,
            Self::UnknownCommand { .. } => 2,
            Self::ConfigParse { .. } | Self::ConfigKeyNotFound { .. } => 3,
            Self::InvalidConfigValue { .. } => 4,
            _ => 1,
        }
    }
}
