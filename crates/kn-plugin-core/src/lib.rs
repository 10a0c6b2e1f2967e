pub mod config;
pub mod error;
pub mod platform;
pub mod plugin;

pub use config::{Config, PluginsConfig, DEFAULT_PLUGINS_DIR, DEFAULT_PLUGIN_PREFIX};
pub use error::{PluginError, Result};
pub use plugin::{
    current_env, ExternalPlugin, FoundPlugin, InternalPlugin, Invoker, Locator, Manager,
    ManagerConfig, Plugin, PluginList, ProcessInvoker, SearchPath, PLUGIN_INFO_FLAG,
};
