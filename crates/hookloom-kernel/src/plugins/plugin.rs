//! The plugin contract.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use hookloom_core::KernelResult;

use crate::component::Component;

/// Trait that all plugins must implement.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique plugin name. Used as the owner id of the hooks it registers.
    fn name(&self) -> &str;

    /// Names of plugins that must already be installed on the component.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Registers the plugin's hooks, behaviors, constants, and resources.
    ///
    /// `own_name` is the plugin's name, handed back for use as an owner id.
    async fn install(
        &self,
        component: &Arc<Component>,
        options: &Value,
        own_name: &str,
    ) -> KernelResult<()>;
}

type InstallFn =
    dyn Fn(Arc<Component>, Value, String) -> BoxFuture<'static, KernelResult<()>> + Send + Sync;

/// A closure-based plugin.
pub struct FnPlugin {
    name: String,
    dependencies: Vec<String>,
    install: Box<InstallFn>,
}

impl FnPlugin {
    /// Creates a plugin from a name and an install closure.
    pub fn new<F, Fut>(name: impl Into<String>, install: F) -> Self
    where
        F: Fn(Arc<Component>, Value, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = KernelResult<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            install: Box::new(move |component, options, own_name| {
                install(component, options, own_name).boxed()
            }),
        }
    }

    /// Declares plugins that must be installed first.
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Debug for FnPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPlugin")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("install", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl Plugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    async fn install(
        &self,
        component: &Arc<Component>,
        options: &Value,
        own_name: &str,
    ) -> KernelResult<()> {
        (self.install)(component.clone(), options.clone(), own_name.to_string()).await
    }
}

/// Wraps an install closure into an `Arc<dyn Plugin>` with no dependencies.
pub fn plugin_fn<F, Fut>(name: impl Into<String>, install: F) -> Arc<dyn Plugin>
where
    F: Fn(Arc<Component>, Value, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = KernelResult<()>> + Send + 'static,
{
    Arc::new(FnPlugin::new(name, install))
}
