//! Plugin Module
//!
//! Resolution and invocation of kn plugins.
//!
//! - `types`: the `Plugin` abstraction (external executables, internal handlers)
//! - `locator`: `<prefix>-<name>` lookup in the plugin directory and search path
//! - `invoker`: running a resolved executable
//! - `manager`: greedy command matching and plugin inventories
//! - `help`: plugin sections of command help

pub mod help;
pub mod invoker;
pub mod locator;
pub mod manager;
pub mod types;

// Re-exports
pub use invoker::{current_env, Invoker, ProcessInvoker};
pub use locator::{Candidate, Locator, SearchPath};
pub use manager::{FoundPlugin, Manager, ManagerConfig};
pub use types::{ExternalPlugin, InternalPlugin, Plugin, PluginList, PLUGIN_INFO_FLAG};
