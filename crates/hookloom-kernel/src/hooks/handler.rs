//! Hook handler trait and its closure and resource-scoped adapters.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::trace;

use hookloom_core::KernelResult;

use super::definitions::HookAction;
use crate::context::HookContext;

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Handles a hook invocation.
    ///
    /// Returning [`HookAction::Halt`] stops the rest of the chain; an error
    /// aborts the dispatch and reaches the caller.
    async fn handle(&self, ctx: &HookContext) -> KernelResult<HookAction>;
}

type HandlerFn = dyn Fn(HookContext) -> BoxFuture<'static, KernelResult<HookAction>> + Send + Sync;

/// A closure-based hook handler for quick handler creation.
pub struct FnHandler {
    handler: Box<HandlerFn>,
}

impl std::fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler")
            .field("handler", &"<closure>")
            .finish()
    }
}

impl FnHandler {
    /// Creates a new closure-based handler.
    ///
    /// The closure receives a clone of the shared context handle and may
    /// resolve to anything convertible into a [`HookAction`]: `()`, `bool`,
    /// or a `serde_json::Value`.
    pub fn new<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = KernelResult<R>> + Send + 'static,
        R: Into<HookAction> + Send + 'static,
    {
        Self {
            handler: Box::new(move |ctx| {
                let fut = handler(ctx);
                async move { fut.await.map(Into::into) }.boxed()
            }),
        }
    }
}

#[async_trait]
impl HookHandler for FnHandler {
    async fn handle(&self, ctx: &HookContext) -> KernelResult<HookAction> {
        (self.handler)(ctx.clone()).await
    }
}

/// Wraps a closure into an `Arc<dyn HookHandler>`.
pub fn handler_fn<F, Fut, R>(handler: F) -> Arc<dyn HookHandler>
where
    F: Fn(HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = KernelResult<R>> + Send + 'static,
    R: Into<HookAction> + Send + 'static,
{
    Arc::new(FnHandler::new(handler))
}

/// Runs the inner handler only for dispatches addressed to one resource.
pub(crate) struct ResourceScopedHandler {
    resource: String,
    component_wide: bool,
    inner: Arc<dyn HookHandler>,
}

impl ResourceScopedHandler {
    pub(crate) fn wrap(
        resource: &str,
        component_wide: bool,
        inner: Arc<dyn HookHandler>,
    ) -> Arc<dyn HookHandler> {
        Arc::new(Self {
            resource: resource.to_string(),
            component_wide,
            inner,
        })
    }
}

#[async_trait]
impl HookHandler for ResourceScopedHandler {
    async fn handle(&self, ctx: &HookContext) -> KernelResult<HookAction> {
        if !self.component_wide && ctx.resource().await.as_deref() != Some(self.resource.as_str()) {
            trace!(resource = %self.resource, "Skipping handler scoped to another resource");
            return Ok(HookAction::Skipped);
        }
        self.inner.handle(ctx).await
    }
}
