//! Behaviors — the functions bound to method names and run by `execute`.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use hookloom_core::KernelResult;

use crate::context::HookContext;

/// A method implementation attached to a component or resource.
#[async_trait]
pub trait Behavior: Send + Sync {
    /// Runs the behavior.
    ///
    /// The context already names the resource (if any) and carries a handle
    /// to the owning component, reachable via [`HookContext::component`].
    async fn call(&self, ctx: &HookContext) -> KernelResult<Value>;
}

type BehaviorFn = dyn Fn(HookContext) -> BoxFuture<'static, KernelResult<Value>> + Send + Sync;

/// A closure-based behavior.
pub struct FnBehavior {
    behavior: Box<BehaviorFn>,
}

impl FnBehavior {
    /// Creates a new closure-based behavior.
    pub fn new<F, Fut>(behavior: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = KernelResult<Value>> + Send + 'static,
    {
        Self {
            behavior: Box::new(move |ctx| behavior(ctx).boxed()),
        }
    }
}

impl std::fmt::Debug for FnBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBehavior")
            .field("behavior", &"<closure>")
            .finish()
    }
}

#[async_trait]
impl Behavior for FnBehavior {
    async fn call(&self, ctx: &HookContext) -> KernelResult<Value> {
        (self.behavior)(ctx.clone()).await
    }
}

/// Wraps a closure into an `Arc<dyn Behavior>`.
pub fn behavior_fn<F, Fut>(behavior: F) -> Arc<dyn Behavior>
where
    F: Fn(HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = KernelResult<Value>> + Send + 'static,
{
    Arc::new(FnBehavior::new(behavior))
}
