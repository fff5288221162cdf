//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod component;
pub mod kernel;
pub mod logging;

use serde::{Deserialize, Serialize};

use self::component::ComponentManifest;
use self::kernel::KernelConfig;
use self::logging::LoggingConfig;

use crate::error::KernelError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Kernel behavior settings.
    #[serde(default)]
    pub kernel: KernelConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Components to construct and register at startup.
    #[serde(default)]
    pub components: Vec<ComponentManifest>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `HOOKLOOM`.
    pub fn load(env: &str) -> Result<Self, KernelError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HOOKLOOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| KernelError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| KernelError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, KernelError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
