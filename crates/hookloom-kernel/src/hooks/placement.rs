//! Relative placement of a new handler within a hook chain.
//!
//! A placement is a single positional splice against the chain as it
//! stands when the handler is registered. Nothing is re-sorted afterwards:
//! a later registration may move relative to an earlier request, and
//! conflicting requests are settled by whichever was registered last.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use hookloom_core::{KernelError, KernelResult};

use super::definitions::HandlerEntry;

/// Placement options accepted by `hook()`.
///
/// At most one field may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Insert before the first handler owned by this plugin or resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_plugin: Option<String>,
    /// Insert after the last handler owned by this plugin or resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_plugin: Option<String>,
    /// Insert before the first handler with this identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_function: Option<String>,
    /// Insert after the first handler with this identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_function: Option<String>,
}

impl Placement {
    /// Appends at the end of the chain.
    pub fn append() -> Self {
        Self::default()
    }

    /// Places before the first handler owned by `owner`.
    pub fn before_plugin(owner: impl Into<String>) -> Self {
        Self {
            before_plugin: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Places after the last handler owned by `owner`.
    pub fn after_plugin(owner: impl Into<String>) -> Self {
        Self {
            after_plugin: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Places before the first handler named `handler_id`.
    pub fn before_function(handler_id: impl Into<String>) -> Self {
        Self {
            before_function: Some(handler_id.into()),
            ..Self::default()
        }
    }

    /// Places after the first handler named `handler_id`.
    pub fn after_function(handler_id: impl Into<String>) -> Self {
        Self {
            after_function: Some(handler_id.into()),
            ..Self::default()
        }
    }

    /// Validates the options and reduces them to a single directive.
    pub fn directive(&self) -> KernelResult<Directive> {
        if self.before_plugin.is_some() && self.after_plugin.is_some() {
            return Err(KernelError::validation(
                "placement cannot combine before_plugin and after_plugin",
            ));
        }
        if self.before_function.is_some() && self.after_function.is_some() {
            return Err(KernelError::validation(
                "placement cannot combine before_function and after_function",
            ));
        }
        let plugin_level = self.before_plugin.is_some() || self.after_plugin.is_some();
        let function_level = self.before_function.is_some() || self.after_function.is_some();
        if plugin_level && function_level {
            return Err(KernelError::validation(
                "placement cannot combine a plugin-level and a function-level directive",
            ));
        }

        let directive = match (
            &self.before_plugin,
            &self.after_plugin,
            &self.before_function,
            &self.after_function,
        ) {
            (Some(owner), _, _, _) => Directive::BeforeOwner(non_empty("before_plugin", owner)?),
            (_, Some(owner), _, _) => Directive::AfterOwner(non_empty("after_plugin", owner)?),
            (_, _, Some(id), _) => Directive::BeforeHandler(non_empty("before_function", id)?),
            (_, _, _, Some(id)) => Directive::AfterHandler(non_empty("after_function", id)?),
            _ => Directive::Append,
        };
        Ok(directive)
    }
}

fn non_empty(field: &str, target: &str) -> KernelResult<String> {
    if target.is_empty() {
        return Err(KernelError::validation(format!(
            "placement {field} target must not be empty"
        )));
    }
    Ok(target.to_string())
}

/// A validated placement directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Append to the end.
    Append,
    /// Before the first entry with this owner.
    BeforeOwner(String),
    /// After the last entry with this owner.
    AfterOwner(String),
    /// Before the first entry with this handler id.
    BeforeHandler(String),
    /// After the first entry with this handler id.
    AfterHandler(String),
}

impl Directive {
    /// Computes the insertion index against the chain's current contents.
    pub fn position(&self, hook: &str, chain: &[Arc<HandlerEntry>]) -> KernelResult<usize> {
        let (found, target) = match self {
            Self::Append => return Ok(chain.len()),
            Self::BeforeOwner(owner) => (
                chain.iter().position(|e| &e.owner_id == owner),
                format!("owner '{owner}'"),
            ),
            Self::AfterOwner(owner) => (
                chain.iter().rposition(|e| &e.owner_id == owner).map(|i| i + 1),
                format!("owner '{owner}'"),
            ),
            Self::BeforeHandler(id) => (
                chain.iter().position(|e| &e.handler_id == id),
                format!("handler '{id}'"),
            ),
            Self::AfterHandler(id) => (
                chain.iter().position(|e| &e.handler_id == id).map(|i| i + 1),
                format!("handler '{id}'"),
            ),
        };
        found.ok_or_else(|| {
            KernelError::placement_not_found(format!("hook '{hook}' has no entry for {target}"))
        })
    }
}
