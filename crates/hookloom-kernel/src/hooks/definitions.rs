//! Hook results, chain entries, and registration requests.

use std::sync::Arc;

use serde_json::Value;

use super::handler::HookHandler;
use super::placement::Placement;

/// What a handler asks the chain to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookAction {
    /// Run the next handler.
    #[default]
    Continue,
    /// Skip the rest of the chain for this invocation.
    Halt,
    /// The handler did not apply to this invocation; run the next one.
    Skipped,
}

impl HookAction {
    /// Returns whether this action stops the chain.
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt)
    }

    /// Returns whether the handler declined to run.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl From<()> for HookAction {
    fn from(_: ()) -> Self {
        Self::Continue
    }
}

/// Only the literal `false` halts.
impl From<bool> for HookAction {
    fn from(value: bool) -> Self {
        if value { Self::Continue } else { Self::Halt }
    }
}

/// Only `Value::Bool(false)` halts; `null`, `0`, and `""` continue.
impl From<Value> for HookAction {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(false) => Self::Halt,
            _ => Self::Continue,
        }
    }
}

/// One handler in a hook chain.
pub struct HandlerEntry {
    /// Plugin, resource, or component that registered the handler.
    pub(crate) owner_id: String,
    /// Identifier unique within the owner for this hook.
    pub(crate) handler_id: String,
    pub(crate) handler: Arc<dyn HookHandler>,
}

impl HandlerEntry {
    /// Creates a new entry.
    pub fn new(
        owner_id: impl Into<String>,
        handler_id: impl Into<String>,
        handler: Arc<dyn HookHandler>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            handler_id: handler_id.into(),
            handler,
        }
    }

    /// Returns the owner identifier.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Returns the handler identifier.
    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    /// Returns the handler.
    pub fn handler(&self) -> &Arc<dyn HookHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("owner_id", &self.owner_id)
            .field("handler_id", &self.handler_id)
            .finish_non_exhaustive()
    }
}

/// A hook handler plus how it should be registered.
///
/// Used by component builders and resource overrides, where the owner is
/// implied by the component or resource name.
#[derive(Clone)]
pub struct HookRegistration {
    /// The handler.
    pub handler: Arc<dyn HookHandler>,
    /// Handler identifier; defaults to the hook name.
    pub handler_id: Option<String>,
    /// Where to splice the handler into the chain.
    pub placement: Placement,
    /// For resource hooks: run for every dispatch, not only the resource's own.
    pub component_wide: bool,
}

impl HookRegistration {
    /// Creates a registration appended at the end of the chain.
    pub fn new(handler: Arc<dyn HookHandler>) -> Self {
        Self {
            handler,
            handler_id: None,
            placement: Placement::default(),
            component_wide: false,
        }
    }

    /// Sets the handler identifier.
    pub fn with_id(mut self, handler_id: impl Into<String>) -> Self {
        self.handler_id = Some(handler_id.into());
        self
    }

    /// Sets the placement directive.
    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Marks a resource hook as running for every dispatch.
    pub fn component_wide(mut self) -> Self {
        self.component_wide = true;
        self
    }
}

impl From<Arc<dyn HookHandler>> for HookRegistration {
    fn from(handler: Arc<dyn HookHandler>) -> Self {
        Self::new(handler)
    }
}

impl std::fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistration")
            .field("handler_id", &self.handler_id)
            .field("placement", &self.placement)
            .field("component_wide", &self.component_wide)
            .finish_non_exhaustive()
    }
}
