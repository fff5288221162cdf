//! Plugin manager — one-time installation with dependency checks.
//!
//! Dependencies are checked by name only, at install time. Plugins are
//! never reordered: the caller installs them in a valid order.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use hookloom_core::{ErrorKind, KernelError, KernelResult};

use super::plugin::Plugin;
use crate::component::Component;
use crate::validate;

/// Tracks which plugins are installed on one component.
#[derive(Debug, Default)]
pub struct PluginManager {
    /// Installed plugin names in installation order.
    installed: RwLock<Vec<String>>,
    /// Plugins whose `install` is currently running.
    pending: Mutex<HashSet<String>>,
}

impl PluginManager {
    /// Creates a new empty plugin manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns installed plugin names in installation order.
    pub async fn installed(&self) -> Vec<String> {
        self.installed.read().await.clone()
    }

    /// Returns whether a plugin is installed.
    pub async fn contains(&self, name: &str) -> bool {
        self.installed.read().await.iter().any(|n| n == name)
    }

    /// Validates and installs a plugin on `component`.
    pub async fn install(
        &self,
        component: &Arc<Component>,
        plugin: Arc<dyn Plugin>,
        options: Value,
    ) -> KernelResult<()> {
        let name = plugin.name().to_string();
        validate::identifier("plugin name", &name)?;

        {
            let installed = self.installed.read().await;
            let mut pending = self.pending.lock().await;

            if installed.contains(&name) || pending.contains(&name) {
                return Err(KernelError::duplicate(format!(
                    "plugin '{name}' is already installed on component '{}'",
                    component.name()
                )));
            }

            let missing: Vec<String> = plugin
                .dependencies()
                .into_iter()
                .filter(|dep| !installed.contains(dep))
                .collect();
            if !missing.is_empty() {
                return Err(KernelError::dependency_missing(format!(
                    "plugin '{name}' requires {} to be installed first",
                    missing
                        .iter()
                        .map(|dep| format!("'{dep}'"))
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }

            pending.insert(name.clone());
        }

        let result = plugin.install(component, &options, &name).await;

        if result.is_ok() {
            self.installed.write().await.push(name.clone());
        }
        self.pending.lock().await.remove(&name);

        match result {
            Ok(()) => {
                info!(
                    component = %component.name(),
                    plugin = %name,
                    "Plugin installed"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    component = %component.name(),
                    plugin = %name,
                    error = %e,
                    "Plugin install failed"
                );
                Err(KernelError::with_source(
                    ErrorKind::InstallFailed,
                    format!("plugin '{name}' install failed: {e}"),
                    e,
                ))
            }
        }
    }
}

impl Component {
    /// Installs a plugin on this component.
    ///
    /// Re-installing a name is an error, every declared dependency must
    /// already be installed, and a failed `install` leaves the plugin
    /// unmarked (side effects it already performed stay in place).
    pub async fn use_plugin(
        self: &Arc<Self>,
        plugin: Arc<dyn Plugin>,
        options: Value,
    ) -> KernelResult<()> {
        self.ensure_open()?;
        self.plugins.install(self, plugin, options).await
    }

    /// Returns installed plugin names in installation order.
    pub async fn installed_plugins(&self) -> Vec<String> {
        self.plugins.installed().await
    }

    /// Returns whether a plugin is installed.
    pub async fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains(name).await
    }
}
