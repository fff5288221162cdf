//! Resources — named sub-scopes layered over a component.
//!
//! A name looked up through a resource resolves in strict order, first
//! match wins:
//!
//! 1. resource constant
//! 2. resource behavior
//! 3. component constant
//! 4. component behavior
//!
//! Resource names are unique per component. Cross-component lookup goes
//! through [`Registry::resource_owners`](crate::registry::Registry::resource_owners).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use hookloom_core::{KernelError, KernelResult};

use crate::behavior::Behavior;
use crate::component::Component;
use crate::context::HookContext;
use crate::hooks::chain::PendingHook;
use crate::hooks::handler::ResourceScopedHandler;
use crate::hooks::{HandlerEntry, HookRegistration};
use crate::validate;

/// A named sub-scope of a component.
pub struct Resource {
    name: String,
    options: Value,
    constants: HashMap<String, Value>,
    behaviors: HashMap<String, Arc<dyn Behavior>>,
}

impl Resource {
    /// Returns the resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the options snapshot taken at registration.
    pub fn options(&self) -> &Value {
        &self.options
    }

    /// Returns a resource-level constant.
    pub fn constant(&self, key: &str) -> Option<&Value> {
        self.constants.get(key)
    }

    /// Returns whether a resource-level behavior is bound to `method`.
    pub fn has_behavior(&self, method: &str) -> bool {
        self.behaviors.contains_key(method)
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("constants", &self.constants)
            .field("behaviors", &self.behaviors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Constants, behaviors, and hooks a resource layers over its component.
#[derive(Default)]
pub struct ResourceOverrides {
    constants: Vec<(String, Value)>,
    behaviors: Vec<(String, Arc<dyn Behavior>)>,
    hooks: Vec<(String, HookRegistration)>,
}

impl ResourceOverrides {
    /// Creates empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource-level constant.
    pub fn constant(mut self, key: impl Into<String>, value: Value) -> Self {
        self.constants.push((key.into(), value));
        self
    }

    /// Adds a resource-level behavior.
    pub fn implement(mut self, method: impl Into<String>, behavior: Arc<dyn Behavior>) -> Self {
        self.behaviors.push((method.into(), behavior));
        self
    }

    /// Adds a hook owned by the resource.
    ///
    /// The handler only runs for dispatches addressed to this resource
    /// unless the registration is marked component-wide.
    pub fn hook(mut self, hook: impl Into<String>, registration: impl Into<HookRegistration>) -> Self {
        self.hooks.push((hook.into(), registration.into()));
        self
    }
}

/// Resources of one component, by name.
#[derive(Debug, Default)]
pub struct ResourceTable {
    resources: RwLock<BTreeMap<String, Arc<Resource>>>,
}

impl ResourceTable {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a resource by name.
    pub async fn get(&self, name: &str) -> Option<Arc<Resource>> {
        self.resources.read().await.get(name).cloned()
    }

    /// Returns whether a resource exists.
    pub async fn contains(&self, name: &str) -> bool {
        self.resources.read().await.contains_key(name)
    }

    /// Returns resource names, sorted.
    pub async fn names(&self) -> Vec<String> {
        self.resources.read().await.keys().cloned().collect()
    }
}

/// Where a name is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Component tables only.
    Component,
    /// A resource layered over its component.
    Resource(&'a str),
}

/// Outcome of resolving a name through a scope.
#[derive(Clone)]
pub enum Resolution {
    /// Static data; returned as-is, never invoked.
    Constant(Value),
    /// A behavior to invoke.
    Behavior(Arc<dyn Behavior>),
    /// Nothing bound to the name.
    Missing,
}

impl Resolution {
    /// Returns whether nothing was found.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns the constant, if the name resolved to one.
    pub fn into_constant(self) -> Option<Value> {
        match self {
            Self::Constant(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Behavior(_) => f.write_str("Behavior(..)"),
            Self::Missing => f.write_str("Missing"),
        }
    }
}

/// Applies the precedence order to already-loaded tables.
pub(crate) fn resolve_layers(
    resource: Option<&Resource>,
    constants: &HashMap<String, Value>,
    behaviors: &HashMap<String, Arc<dyn Behavior>>,
    name: &str,
) -> Resolution {
    if let Some(resource) = resource {
        if let Some(value) = resource.constants.get(name) {
            return Resolution::Constant(value.clone());
        }
        if let Some(behavior) = resource.behaviors.get(name) {
            return Resolution::Behavior(behavior.clone());
        }
    }
    if let Some(value) = constants.get(name) {
        return Resolution::Constant(value.clone());
    }
    if let Some(behavior) = behaviors.get(name) {
        return Resolution::Behavior(behavior.clone());
    }
    Resolution::Missing
}

impl Component {
    /// Registers a resource with its own constants, behaviors, and hooks.
    ///
    /// Resource hooks are owned by the resource name. Nothing is registered
    /// unless every override is accepted.
    pub async fn add_resource(
        self: &Arc<Self>,
        name: &str,
        options: Value,
        overrides: ResourceOverrides,
    ) -> KernelResult<ResourceView> {
        self.ensure_open()?;
        validate::identifier("resource name", name)?;

        let mut constants = HashMap::with_capacity(overrides.constants.len());
        for (key, value) in overrides.constants {
            validate::identifier("constant key", &key)?;
            if constants.insert(key.clone(), value).is_some() {
                return Err(KernelError::duplicate(format!(
                    "resource '{name}' declares constant '{key}' twice"
                )));
            }
        }

        let mut behaviors = HashMap::with_capacity(overrides.behaviors.len());
        for (method, behavior) in overrides.behaviors {
            validate::identifier("method name", &method)?;
            if behaviors.insert(method.clone(), behavior).is_some() {
                return Err(KernelError::duplicate(format!(
                    "resource '{name}' declares behavior '{method}' twice"
                )));
            }
        }

        let mut resources = self.resources.resources.write().await;
        if resources.contains_key(name) {
            return Err(KernelError::duplicate(format!(
                "component '{}' already has resource '{name}'",
                self.name()
            )));
        }

        let pending: Vec<PendingHook> = overrides
            .hooks
            .into_iter()
            .map(|(hook, registration)| scoped_hook(name, hook, registration))
            .collect();
        let hook_count = pending.len();
        self.hooks.insert_all(pending).await?;

        let resource = Arc::new(Resource {
            name: name.to_string(),
            options,
            constants,
            behaviors,
        });
        resources.insert(name.to_string(), resource.clone());
        drop(resources);

        info!(
            component = %self.name(),
            resource = %name,
            constants = resource.constants.len(),
            behaviors = resource.behaviors.len(),
            hooks = hook_count,
            "Resource registered"
        );

        Ok(ResourceView {
            component: self.clone(),
            resource,
        })
    }

    /// Returns a view of one resource.
    pub async fn resource(self: &Arc<Self>, name: &str) -> Option<ResourceView> {
        let resource = self.resources.get(name).await?;
        Some(ResourceView {
            component: self.clone(),
            resource,
        })
    }

    /// Returns whether a resource exists.
    pub async fn has_resource(&self, name: &str) -> bool {
        self.resources.contains(name).await
    }

    /// Returns resource names, sorted.
    pub async fn resource_names(&self) -> Vec<String> {
        self.resources.names().await
    }

    /// Resolves a name through a scope.
    pub async fn resolve(&self, scope: Scope<'_>, name: &str) -> KernelResult<Resolution> {
        let resource = match scope {
            Scope::Component => None,
            Scope::Resource(resource) => Some(self.resources.get(resource).await.ok_or_else(|| {
                KernelError::not_found(format!(
                    "component '{}' has no resource '{resource}'",
                    self.name()
                ))
            })?),
        };

        let constants = self.constants.read().await;
        let behaviors = self.behaviors.read().await;
        Ok(resolve_layers(
            resource.as_deref(),
            &constants,
            &behaviors,
            name,
        ))
    }

    /// Returns a component-level constant.
    pub async fn get_constant(&self, key: &str) -> Option<Value> {
        self.constants.read().await.get(key).cloned()
    }
}

fn scoped_hook(resource: &str, hook: String, registration: HookRegistration) -> PendingHook {
    let handler_id = registration.handler_id.unwrap_or_else(|| hook.clone());
    let handler =
        ResourceScopedHandler::wrap(resource, registration.component_wide, registration.handler);
    PendingHook {
        entry: HandlerEntry::new(resource, handler_id, handler),
        placement: registration.placement,
        hook,
    }
}

/// A component seen through one of its resources.
#[derive(Clone)]
pub struct ResourceView {
    component: Arc<Component>,
    resource: Arc<Resource>,
}

impl ResourceView {
    /// Returns the resource name.
    pub fn name(&self) -> &str {
        self.resource.name()
    }

    /// Returns the resource options.
    pub fn options(&self) -> &Value {
        self.resource.options()
    }

    /// Returns the owning component.
    pub fn component(&self) -> &Arc<Component> {
        &self.component
    }

    /// Returns the underlying resource.
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    /// Resolves a name through this resource.
    pub async fn resolve(&self, name: &str) -> Resolution {
        let constants = self.component.constants.read().await;
        let behaviors = self.component.behaviors.read().await;
        resolve_layers(Some(self.resource.as_ref()), &constants, &behaviors, name)
    }

    /// Returns the constant `key` resolves to, if the first match is a constant.
    pub async fn get_constant(&self, key: &str) -> Option<Value> {
        self.resolve(key).await.into_constant()
    }

    /// Executes a method through this resource.
    pub async fn call_method(&self, method: &str, ctx: &HookContext) -> KernelResult<Value> {
        self.component
            .execute_in(Scope::Resource(self.name()), method, ctx)
            .await
    }

    /// Runs a hook chain with the context addressed to this resource.
    ///
    /// The context's previous resource is restored once the chain ends.
    pub async fn execute_hook(&self, hook: &str, ctx: &HookContext) -> KernelResult<HookContext> {
        let guard = ctx.enter_scope(Some(self.name().to_string()), None).await;
        let result = self.component.execute_hook(hook, ctx).await;
        ctx.leave_scope(guard).await;
        result
    }

    /// Registers a hook owned by this resource.
    pub async fn hook(
        &self,
        hook: &str,
        registration: impl Into<HookRegistration>,
    ) -> KernelResult<usize> {
        self.component.ensure_open()?;
        let pending = scoped_hook(self.name(), hook.to_string(), registration.into());
        let positions = self.component.hooks.insert_all(vec![pending]).await?;
        Ok(positions.into_iter().next().unwrap_or_default())
    }
}

impl std::fmt::Debug for ResourceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceView")
            .field("component", &self.component.name())
            .field("resource", &self.resource.name())
            .finish()
    }
}
