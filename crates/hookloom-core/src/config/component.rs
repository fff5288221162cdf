//! Declarative component manifests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A component declared in configuration rather than in code.
///
/// Manifests can only carry data: constants are plain values, while hooks
/// and behaviors must be attached by code after the component is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentManifest {
    /// Component name.
    pub name: String,
    /// Semantic version; falls back to `KernelConfig::default_version`.
    #[serde(default)]
    pub version: Option<String>,
    /// Component-level constants.
    #[serde(default)]
    pub constants: Map<String, Value>,
}
