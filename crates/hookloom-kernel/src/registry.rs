//! Component registry — indexes components by name and semantic version.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use semver::Version;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use hookloom_core::config::kernel::KernelConfig;
use hookloom_core::{KernelError, KernelResult};

use crate::component::{Component, ComponentBuilder};
use crate::validate;
use crate::version::{LATEST, VersionQuery};

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// One registered name and its versions, highest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryListing {
    pub name: String,
    pub versions: Vec<String>,
}

/// Index from `(name, version)` to component.
#[derive(Debug, Default)]
pub struct Registry {
    /// Settings handed to components created through [`Registry::create`].
    settings: KernelConfig,
    /// Name → version → component.
    components: RwLock<HashMap<String, BTreeMap<Version, Arc<Component>>>>,
}

impl Registry {
    /// Creates an empty registry with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given settings.
    pub fn with_config(settings: KernelConfig) -> Self {
        Self {
            settings,
            components: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the process-wide registry.
    ///
    /// Hosts that need isolation should own a [`Registry`] instead.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Returns the settings used by [`Registry::create`].
    pub fn settings(&self) -> &KernelConfig {
        &self.settings
    }

    /// Registers a component under its name and version.
    pub async fn register(&self, component: Arc<Component>) -> KernelResult<()> {
        validate::identifier("component name", component.name())?;

        let mut components = self.components.write().await;
        let versions = components.entry(component.name().to_string()).or_default();
        if versions.contains_key(component.version()) {
            return Err(KernelError::duplicate(format!(
                "component '{}@{}' is already registered",
                component.name(),
                component.version()
            )));
        }
        versions.insert(component.version().clone(), component.clone());
        drop(components);

        info!(
            component = %component.name(),
            version = %component.version(),
            "Component registered"
        );
        Ok(())
    }

    /// Builds a component with this registry's settings and registers it.
    ///
    /// Settings given on the builder take precedence.
    pub async fn create(&self, builder: ComponentBuilder) -> KernelResult<Arc<Component>> {
        let component = builder.settings_if_unset(&self.settings).build().await?;
        self.register(component.clone()).await?;
        Ok(component)
    }

    /// Looks up a component by exact version, `latest`, at-least version,
    /// or range.
    ///
    /// A malformed request is logged and yields `None`.
    pub async fn get(&self, name: &str, request: &str) -> Option<Arc<Component>> {
        let components = self.components.read().await;
        let versions = components.get(name)?;

        if let Ok(exact) = Version::parse(request.trim()) {
            if let Some(component) = versions.get(&exact) {
                return Some(component.clone());
            }
        }

        let query = match VersionQuery::parse(request) {
            Ok(query) => query,
            Err(e) => {
                warn!(component = %name, request = %request, error = %e, "Malformed version request");
                return None;
            }
        };
        let selected = query.select(versions.keys())?;
        debug!(component = %name, request = %request, selected = %selected, "Version resolved");
        versions.get(selected).cloned()
    }

    /// Alias of [`Registry::get`].
    pub async fn find(&self, name: &str, request: &str) -> Option<Arc<Component>> {
        self.get(name, request).await
    }

    /// Returns the highest registered version of `name`.
    pub async fn latest(&self, name: &str) -> Option<Arc<Component>> {
        self.get(name, LATEST).await
    }

    /// Returns whether `name` is registered, optionally requiring a
    /// version request to resolve.
    pub async fn has(&self, name: &str, request: Option<&str>) -> bool {
        match request {
            None => self
                .components
                .read()
                .await
                .get(name)
                .is_some_and(|versions| !versions.is_empty()),
            Some(request) => self.get(name, request).await.is_some(),
        }
    }

    /// Returns the registered versions of `name`, highest first.
    pub async fn versions(&self, name: &str) -> Vec<String> {
        self.components
            .read()
            .await
            .get(name)
            .map(|versions| versions.keys().rev().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns every registered name with its versions, sorted by name.
    pub async fn list(&self) -> Vec<RegistryListing> {
        let components = self.components.read().await;
        let mut listing: Vec<RegistryListing> = components
            .iter()
            .map(|(name, versions)| RegistryListing {
                name: name.clone(),
                versions: versions.keys().rev().map(ToString::to_string).collect(),
            })
            .collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        listing
    }

    /// Returns every component that owns a resource named `resource`,
    /// ordered by name then ascending version.
    pub async fn resource_owners(&self, resource: &str) -> Vec<Arc<Component>> {
        let mut candidates: Vec<Arc<Component>> = {
            let components = self.components.read().await;
            components
                .values()
                .flat_map(|versions| versions.values().cloned())
                .collect()
        };
        candidates.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.version().cmp(b.version())));

        let mut owners = Vec::new();
        for component in candidates {
            if component.has_resource(resource).await {
                owners.push(component);
            }
        }
        owners
    }

    /// Returns the number of registered `(name, version)` pairs.
    pub async fn len(&self) -> usize {
        self.components.read().await.values().map(BTreeMap::len).sum()
    }

    /// Returns whether nothing is registered.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes every registration.
    pub async fn reset(&self) {
        let mut components = self.components.write().await;
        let cleared: usize = components.values().map(BTreeMap::len).sum();
        components.clear();
        info!(cleared, "Registry reset");
    }
}
