//! Execution engine — sequential hook dispatch and behavior execution.
//!
//! Handlers in one chain run strictly one after another, each awaited with
//! the same shared context. A handler returning `Halt` (the literal `false`)
//! ends the chain for that invocation; an error ends it and reaches the
//! caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info};

use hookloom_core::{KernelError, KernelResult};

use crate::component::Component;
use crate::context::HookContext;
use crate::resources::{Resolution, Scope};

/// Result of running one hook chain.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// The context passed in; same handle, never a copy.
    pub context: HookContext,
    /// Number of handlers that ran, including the one that halted.
    pub invoked: usize,
    /// Number of resource-scoped handlers passed over because the
    /// dispatch was addressed elsewhere.
    pub skipped: usize,
    /// `(owner_id, handler_id)` of the handler that halted the chain.
    pub halted_by: Option<(String, String)>,
}

impl DispatchReport {
    /// Returns whether a handler halted the chain.
    pub fn halted(&self) -> bool {
        self.halted_by.is_some()
    }
}

impl Component {
    fn note_dispatch(&self) {
        if self.settings().seal_on_first_dispatch {
            self.seal();
        }
    }

    /// Runs the chain for `hook` and reports how it ended.
    pub async fn dispatch_hook(&self, hook: &str, ctx: &HookContext) -> KernelResult<DispatchReport> {
        self.note_dispatch();
        let handlers = self.hooks.snapshot(hook).await;

        let mut report = DispatchReport {
            context: ctx.clone(),
            invoked: 0,
            skipped: 0,
            halted_by: None,
        };
        if handlers.is_empty() {
            return Ok(report);
        }

        debug!(
            component = %self.name(),
            hook = %hook,
            handler_count = handlers.len(),
            invocation_id = %ctx.id(),
            "Dispatching hook"
        );

        let limit = self.settings().handler_timeout();
        for entry in &handlers {
            let action = guarded(limit, entry.handler().handle(ctx), || {
                format!(
                    "handler '{}' of '{}' on hook '{hook}'",
                    entry.handler_id(),
                    entry.owner_id()
                )
            })
            .await?;

            if action.is_skipped() {
                report.skipped += 1;
                continue;
            }
            report.invoked += 1;
            if action.is_halt() {
                info!(
                    component = %self.name(),
                    hook = %hook,
                    owner_id = %entry.owner_id(),
                    handler_id = %entry.handler_id(),
                    invocation_id = %ctx.id(),
                    "Handler halted hook chain"
                );
                report.halted_by = Some((
                    entry.owner_id().to_string(),
                    entry.handler_id().to_string(),
                ));
                break;
            }
        }

        Ok(report)
    }

    /// Runs the chain for `hook` and returns the shared context.
    ///
    /// An unknown hook name runs nothing.
    pub async fn execute_hook(&self, hook: &str, ctx: &HookContext) -> KernelResult<HookContext> {
        Ok(self.dispatch_hook(hook, ctx).await?.context)
    }

    /// Executes a method at component scope.
    pub async fn execute(self: &Arc<Self>, method: &str, ctx: &HookContext) -> KernelResult<Value> {
        self.execute_in(Scope::Component, method, ctx).await
    }

    /// Alias of [`Component::execute`].
    pub async fn call_method(self: &Arc<Self>, method: &str, ctx: &HookContext) -> KernelResult<Value> {
        self.execute(method, ctx).await
    }

    /// Resolves `method` through `scope` and runs it.
    ///
    /// A constant is returned as data. A behavior is invoked with the
    /// context naming the resource (for resource scopes) and holding a
    /// handle to this component; the previous scope is restored when the
    /// behavior returns, so nested calls inherit it and later calls on the
    /// same context do not.
    pub async fn execute_in(
        self: &Arc<Self>,
        scope: Scope<'_>,
        method: &str,
        ctx: &HookContext,
    ) -> KernelResult<Value> {
        self.note_dispatch();

        match self.resolve(scope, method).await? {
            Resolution::Constant(value) => {
                debug!(component = %self.name(), method = %method, "Resolved to constant");
                Ok(value)
            }
            Resolution::Behavior(behavior) => {
                let resource = match scope {
                    Scope::Resource(resource) => Some(resource.to_string()),
                    Scope::Component => None,
                };
                let guard = ctx.enter_scope(resource, Some(self.clone())).await;

                debug!(
                    component = %self.name(),
                    method = %method,
                    invocation_id = %ctx.id(),
                    "Executing behavior"
                );
                let result = guarded(self.settings().handler_timeout(), behavior.call(ctx), || {
                    format!("behavior '{method}'")
                })
                .await;

                // The resource and component apply only for the duration of the call.
                ctx.leave_scope(guard).await;
                result
            }
            Resolution::Missing => Err(KernelError::method_not_found(match scope {
                Scope::Component => format!(
                    "method '{method}' not found on component '{}@{}'",
                    self.name(),
                    self.version()
                ),
                Scope::Resource(resource) => format!(
                    "method '{method}' not found on resource '{resource}' of component '{}@{}'",
                    self.name(),
                    self.version()
                ),
            })),
        }
    }
}

/// Awaits `fut`, bounded by `limit` when one is configured.
async fn guarded<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = KernelResult<T>>,
    describe: impl FnOnce() -> String,
) -> KernelResult<T> {
    let Some(limit) = limit else {
        return fut.await;
    };
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            let what = describe();
            error!(target_call = %what, timeout_ms = limit.as_millis() as u64, "Call timed out");
            Err(KernelError::timeout(format!(
                "{what} timed out after {}ms",
                limit.as_millis()
            )))
        }
    }
}
