//! Hook system — handler trait, placement directives, and ordered chains.

pub mod chain;
pub mod definitions;
pub mod handler;
pub mod placement;

pub use chain::HookTable;
pub use definitions::{HandlerEntry, HookAction, HookRegistration};
pub use handler::{FnHandler, HookHandler, handler_fn};
pub use placement::{Directive, Placement};
