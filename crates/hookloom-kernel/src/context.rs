//! Dispatch context shared by every handler and behavior of one invocation.
//!
//! A [`HookContext`] is a handle: cloning it never copies the data, so a
//! value written by one handler is visible to every later handler in the
//! chain and to nested `execute` calls reached from inside a handler.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::component::Component;

/// Shared, mutable per-invocation state.
#[derive(Clone)]
pub struct HookContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    /// Invocation identifier used in log fields.
    id: Uuid,
    /// Caller-defined key/value data.
    data: RwLock<Map<String, Value>>,
    /// Scope the kernel attaches before invoking behaviors.
    scope: RwLock<DispatchScope>,
}

/// Scope saved by [`HookContext::enter_scope`].
pub(crate) struct ScopeGuard {
    previous: DispatchScope,
}

#[derive(Default)]
struct DispatchScope {
    /// Resource the current dispatch is addressed to.
    resource: Option<String>,
    /// Component owning the behavior being executed.
    component: Option<Arc<Component>>,
}

impl HookContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::from_map(Map::new())
    }

    /// Creates a context seeded with the given data.
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self::with_scope(data, DispatchScope::default())
    }

    /// Creates an empty context addressed to a resource.
    ///
    /// Resource-scoped hook handlers only run when the context names
    /// their resource.
    pub fn for_resource(resource: impl Into<String>) -> Self {
        Self::for_resource_with(resource, Map::new())
    }

    /// Creates a context addressed to a resource, seeded with data.
    pub fn for_resource_with(resource: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::with_scope(
            data,
            DispatchScope {
                resource: Some(resource.into()),
                component: None,
            },
        )
    }

    fn with_scope(data: Map<String, Value>, scope: DispatchScope) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                id: Uuid::new_v4(),
                data: RwLock::new(data),
                scope: RwLock::new(scope),
            }),
        }
    }

    /// Returns the invocation identifier.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Returns whether two handles point at the same context.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Reads a value.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.data.read().await.get(key).cloned()
    }

    /// Writes a value, returning the previous one.
    pub async fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.inner.data.write().await.insert(key.into(), value)
    }

    /// Removes a value.
    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.inner.data.write().await.remove(key)
    }

    /// Returns whether a key is present.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.data.read().await.contains_key(key)
    }

    /// Applies a closure to the data under a single write lock.
    pub async fn update<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        let mut data = self.inner.data.write().await;
        f(&mut data)
    }

    /// Returns a copy of the current data.
    pub async fn snapshot(&self) -> Map<String, Value> {
        self.inner.data.read().await.clone()
    }

    /// Returns the resource this dispatch is addressed to.
    pub async fn resource(&self) -> Option<String> {
        self.inner.scope.read().await.resource.clone()
    }

    /// Sets the resource this dispatch is addressed to.
    pub async fn set_resource(&self, resource: Option<String>) {
        self.inner.scope.write().await.resource = resource;
    }

    /// Returns the component that owns the behavior being executed.
    pub async fn component(&self) -> Option<Arc<Component>> {
        self.inner.scope.read().await.component.clone()
    }

    /// Points the context at `resource` and `component`, returning the
    /// previous scope so the caller can put it back.
    pub(crate) async fn enter_scope(
        &self,
        resource: Option<String>,
        component: Option<Arc<Component>>,
    ) -> ScopeGuard {
        let mut scope = self.inner.scope.write().await;
        let previous = DispatchScope {
            resource: scope.resource.clone(),
            component: scope.component.clone(),
        };
        if resource.is_some() {
            scope.resource = resource;
        }
        if component.is_some() {
            scope.component = component;
        }
        ScopeGuard { previous }
    }

    pub(crate) async fn leave_scope(&self, guard: ScopeGuard) {
        *self.inner.scope.write().await = guard.previous;
    }
}

impl Default for HookContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HookContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookContext")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}
