use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, Result};

const CONFIG_FILE: &str = "config.toml";

/// Default plugin directory, expanded lazily at lookup time
pub const DEFAULT_PLUGINS_DIR: &str = "~/.config/kn/plugins";

/// Plugin file name prefix used by the kn command line
pub const DEFAULT_PLUGIN_PREFIX: &str = "kn";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# kn configuration file
# Location: ~/.config/kn/config.toml

[plugins]
# Directory holding plugin executables named kn-<command>[-<subcommand>...]
# A leading ~ is expanded to the home directory
directory = "~/.config/kn/plugins"

# Also look for kn-* executables on the PATH
lookup-in-path = false
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// Plugin discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PluginsConfig {
    /// Plugin directory (may start with ~)
    #[serde(default = "default_plugins_dir")]
    pub directory: PathBuf,

    /// Also search the PATH
    #[serde(default)]
    pub lookup_in_path: bool,
}

fn default_plugins_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PLUGINS_DIR)
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            directory: default_plugins_dir(),
            lookup_in_path: false,
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| PluginError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self).map_err(|e| PluginError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "plugins.directory" => Some(self.plugins.directory.display().to_string()),
            "plugins.lookup-in-path" => Some(self.plugins.lookup_in_path.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "plugins.directory" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(PluginError::InvalidConfigValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.plugins.directory = PathBuf::from(trimmed);
                Ok(())
            }
            "plugins.lookup-in-path" => {
                self.plugins.lookup_in_path = parse_bool(key, value)?;
                Ok(())
            }
            _ => Err(PluginError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        ["plugins.directory", "plugins.lookup-in-path"]
            .iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(PluginError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
