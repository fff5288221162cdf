//! Prelude for convenient imports.

pub use async_trait::async_trait;
pub use serde_json::{Value, json};

pub use crate::behavior::{Behavior, behavior_fn};
pub use crate::component::{Component, ComponentBuilder};
pub use crate::context::HookContext;
pub use crate::execution::DispatchReport;
pub use crate::hooks::{HookAction, HookHandler, HookRegistration, Placement, handler_fn};
pub use crate::plugins::{Plugin, plugin_fn};
pub use crate::registry::Registry;
pub use crate::resources::{Resolution, ResourceOverrides, ResourceView, Scope};
pub use crate::version::VersionQuery;

pub use hookloom_core::{ErrorKind, KernelError, KernelResult};

pub use crate::hook_context;
