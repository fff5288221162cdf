//! Component — the named, versioned extensible unit.
//!
//! A component owns its hook chains, behavior and constant tables, the set
//! of installed plugins, and its resources. Tables are append-only: there is
//! no unregister API and a name can be bound only once per scope.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use semver::Version;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use hookloom_core::config::component::ComponentManifest;
use hookloom_core::config::kernel::KernelConfig;
use hookloom_core::{KernelError, KernelResult};

use crate::behavior::Behavior;
use crate::hooks::chain::{HookTable, PendingHook};
use crate::hooks::{HandlerEntry, HookHandler, HookRegistration, Placement};
use crate::plugins::PluginManager;
use crate::resources::ResourceTable;
use crate::validate;

/// A named, versioned extensible unit.
pub struct Component {
    name: String,
    version: Version,
    settings: KernelConfig,
    pub(crate) hooks: HookTable,
    pub(crate) behaviors: RwLock<HashMap<String, Arc<dyn Behavior>>>,
    pub(crate) constants: RwLock<HashMap<String, Value>>,
    pub(crate) plugins: PluginManager,
    pub(crate) resources: ResourceTable,
    sealed: AtomicBool,
}

impl Component {
    /// Starts building a component.
    pub fn builder(name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder::new(name)
    }

    /// Returns the component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the component version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Returns the kernel settings this component was built with.
    pub fn settings(&self) -> &KernelConfig {
        &self.settings
    }

    /// Closes registration. Hooks, behaviors, constants, resources, and
    /// plugins can no longer be added.
    pub fn seal(&self) {
        if !self.sealed.swap(true, Ordering::SeqCst) {
            info!(component = %self.name, version = %self.version, "Component sealed");
        }
    }

    /// Returns whether registration is closed.
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_open(&self) -> KernelResult<()> {
        if self.is_sealed() {
            return Err(KernelError::registration_closed(format!(
                "component '{}@{}' no longer accepts registrations",
                self.name, self.version
            )));
        }
        Ok(())
    }

    /// Registers a hook handler and returns its index in the chain.
    ///
    /// `owner_id` is the registering plugin or resource; `handler_id` must
    /// be unique within that owner for this hook.
    pub async fn hook(
        &self,
        hook: &str,
        owner_id: &str,
        handler_id: &str,
        placement: Placement,
        handler: Arc<dyn HookHandler>,
    ) -> KernelResult<usize> {
        self.ensure_open()?;
        self.hooks
            .insert(hook, HandlerEntry::new(owner_id, handler_id, handler), &placement)
            .await
    }

    /// Binds a behavior to a method name.
    pub async fn implement(&self, method: &str, behavior: Arc<dyn Behavior>) -> KernelResult<()> {
        self.ensure_open()?;
        validate::identifier("method name", method)?;

        let mut behaviors = self.behaviors.write().await;
        if behaviors.contains_key(method) {
            return Err(KernelError::duplicate(format!(
                "component '{}' already implements '{method}'",
                self.name
            )));
        }
        behaviors.insert(method.to_string(), behavior);

        info!(component = %self.name, method = %method, "Behavior registered");
        Ok(())
    }

    /// Binds a constant to a key.
    pub async fn add_constant(&self, key: &str, value: Value) -> KernelResult<()> {
        self.ensure_open()?;
        validate::identifier("constant key", key)?;

        let mut constants = self.constants.write().await;
        if constants.contains_key(key) {
            return Err(KernelError::duplicate(format!(
                "component '{}' already defines constant '{key}'",
                self.name
            )));
        }
        constants.insert(key.to_string(), value);

        info!(component = %self.name, key = %key, "Constant registered");
        Ok(())
    }

    /// Returns whether a component-level behavior is bound to `method`.
    pub async fn has_behavior(&self, method: &str) -> bool {
        self.behaviors.read().await.contains_key(method)
    }

    /// Returns component-level behavior names, sorted.
    pub async fn behavior_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.behaviors.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns component-level constant keys, sorted.
    pub async fn constant_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constants.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns `(owner_id, handler_id)` pairs for a hook in chain order.
    pub async fn hook_order(&self, hook: &str) -> Vec<(String, String)> {
        self.hooks.order(hook).await
    }

    /// Returns all hook names with handlers, sorted.
    pub async fn hook_names(&self) -> Vec<String> {
        self.hooks.hook_names().await
    }

    /// Returns the number of handlers registered for a hook.
    pub async fn handler_count(&self, hook: &str) -> usize {
        self.hooks.handler_count(hook).await
    }

    /// Returns `(hook, handler_id)` pairs registered by one owner.
    pub async fn hooks_owned_by(&self, owner_id: &str) -> Vec<(String, String)> {
        self.hooks.owned_by(owner_id).await
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("version", &self.version.to_string())
            .field("sealed", &self.is_sealed())
            .finish_non_exhaustive()
    }
}

/// Construction options for a [`Component`].
pub struct ComponentBuilder {
    name: String,
    version: Option<String>,
    settings: Option<KernelConfig>,
    hooks: Vec<(String, HookRegistration)>,
    behaviors: Vec<(String, Arc<dyn Behavior>)>,
    constants: Vec<(String, Value)>,
}

impl ComponentBuilder {
    /// Creates a builder for a component with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            settings: None,
            hooks: Vec::new(),
            behaviors: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Creates a builder from a configuration manifest.
    pub fn from_manifest(manifest: &ComponentManifest) -> Self {
        let mut builder = Self::new(manifest.name.clone());
        builder.version = manifest.version.clone();
        builder.constants = manifest
            .constants
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        builder
    }

    /// Sets the semantic version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the kernel settings.
    pub fn settings(mut self, settings: KernelConfig) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Adds a hook handler owned by the component itself.
    ///
    /// The handler id defaults to the hook name.
    pub fn hook(mut self, hook: impl Into<String>, registration: impl Into<HookRegistration>) -> Self {
        self.hooks.push((hook.into(), registration.into()));
        self
    }

    /// Adds a behavior.
    pub fn implement(mut self, method: impl Into<String>, behavior: Arc<dyn Behavior>) -> Self {
        self.behaviors.push((method.into(), behavior));
        self
    }

    /// Adds a constant.
    pub fn constant(mut self, key: impl Into<String>, value: Value) -> Self {
        self.constants.push((key.into(), value));
        self
    }

    pub(crate) fn settings_if_unset(mut self, settings: &KernelConfig) -> Self {
        if self.settings.is_none() {
            self.settings = Some(settings.clone());
        }
        self
    }

    /// Validates every option and builds the component.
    ///
    /// Nothing is returned unless every constant, behavior, and hook was
    /// accepted.
    pub async fn build(self) -> KernelResult<Arc<Component>> {
        validate::identifier("component name", &self.name)?;
        let settings = self.settings.unwrap_or_default();
        let raw_version = self
            .version
            .unwrap_or_else(|| settings.default_version.clone());
        let version = Version::parse(raw_version.trim()).map_err(|e| {
            KernelError::validation(format!(
                "component '{}' has invalid semantic version '{raw_version}': {e}",
                self.name
            ))
        })?;

        let mut constants = HashMap::with_capacity(self.constants.len());
        for (key, value) in self.constants {
            validate::identifier("constant key", &key)?;
            if constants.insert(key.clone(), value).is_some() {
                return Err(KernelError::duplicate(format!(
                    "component '{}' declares constant '{key}' twice",
                    self.name
                )));
            }
        }

        let mut behaviors = HashMap::with_capacity(self.behaviors.len());
        for (method, behavior) in self.behaviors {
            validate::identifier("method name", &method)?;
            if behaviors.insert(method.clone(), behavior).is_some() {
                return Err(KernelError::duplicate(format!(
                    "component '{}' declares behavior '{method}' twice",
                    self.name
                )));
            }
        }

        let hooks = HookTable::new();
        let pending = self
            .hooks
            .into_iter()
            .map(|(hook, registration)| {
                let handler_id = registration.handler_id.unwrap_or_else(|| hook.clone());
                PendingHook {
                    entry: HandlerEntry::new(self.name.clone(), handler_id, registration.handler),
                    placement: registration.placement,
                    hook,
                }
            })
            .collect();
        hooks.insert_all(pending).await?;

        info!(
            component = %self.name,
            version = %version,
            constants = constants.len(),
            behaviors = behaviors.len(),
            "Component constructed"
        );

        Ok(Arc::new(Component {
            name: self.name,
            version,
            settings,
            hooks,
            behaviors: RwLock::new(behaviors),
            constants: RwLock::new(constants),
            plugins: PluginManager::new(),
            resources: ResourceTable::new(),
            sealed: AtomicBool::new(false),
        }))
    }
}

impl std::fmt::Debug for ComponentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBuilder")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("hooks", &self.hooks.len())
            .field("behaviors", &self.behaviors.len())
            .field("constants", &self.constants.len())
            .finish()
    }
}
