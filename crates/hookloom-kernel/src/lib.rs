//! # hookloom-kernel
//!
//! In-process extensibility kernel. Provides:
//!
//! - A versioned component registry with `latest`, at-least, and range queries
//! - Ordered hook chains with relative placement (before/after a plugin or handler)
//! - Plugin installation with one-time and dependency checks
//! - Resource scopes that layer constants, behaviors, and hooks over a component
//! - Sequential async dispatch with early exit

pub mod behavior;
pub mod component;
pub mod context;
pub mod execution;
pub mod hooks;
pub mod macros;
pub mod plugins;
pub mod prelude;
pub mod registry;
pub mod resources;
pub mod version;

mod validate;

pub use behavior::{Behavior, behavior_fn};
pub use component::{Component, ComponentBuilder};
pub use context::HookContext;
pub use execution::DispatchReport;
pub use hooks::{HookAction, HookHandler, HookRegistration, Placement, handler_fn};
pub use plugins::{Plugin, plugin_fn};
pub use registry::{Registry, RegistryListing};
pub use resources::{Resolution, ResourceOverrides, ResourceView, Scope};
pub use version::VersionQuery;

pub use hookloom_core::{ErrorKind, KernelError, KernelResult};
