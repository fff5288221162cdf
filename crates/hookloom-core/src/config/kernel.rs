//! Kernel behavior configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings applied to every component built by a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Version assigned to components constructed without one.
    #[serde(default = "default_version")]
    pub default_version: String,
    /// Close registration on a component once it dispatches for the first time.
    #[serde(default)]
    pub seal_on_first_dispatch: bool,
    /// Upper bound for a single handler or behavior await, in milliseconds.
    ///
    /// `None` waits indefinitely.
    #[serde(default)]
    pub handler_timeout_ms: Option<u64>,
}

impl KernelConfig {
    /// Returns the handler timeout as a `Duration`, if one is configured.
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            default_version: default_version(),
            seal_on_first_dispatch: false,
            handler_timeout_ms: None,
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}
