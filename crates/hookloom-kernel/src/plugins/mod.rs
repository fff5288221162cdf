//! Plugins — installable bundles of hooks, behaviors, and resources.

pub mod manager;
pub mod plugin;

pub use manager::PluginManager;
pub use plugin::{FnPlugin, Plugin, plugin_fn};
