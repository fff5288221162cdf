//! Hookloom host — loads configuration, boots the declared components into
//! a registry, and reports what was registered.

use tracing_subscriber::{EnvFilter, fmt};

use hookloom_core::KernelError;
use hookloom_core::config::AppConfig;
use hookloom_core::config::logging::LogFormat;
use hookloom_kernel::{ComponentBuilder, Registry};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, KernelError> {
    let env = std::env::var("HOOKLOOM_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let logging = &config.logging;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(logging.with_target);

    match logging.format {
        LogFormat::Json => builder.json().with_thread_ids(true).init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Boot every declared component and log the resulting registry
async fn run(config: AppConfig) -> Result<(), KernelError> {
    tracing::info!("Starting hookloom v{}", env!("CARGO_PKG_VERSION"));

    let registry = Registry::with_config(config.kernel.clone());

    for manifest in &config.components {
        let component = registry
            .create(ComponentBuilder::from_manifest(manifest))
            .await?;
        let constants = component.constant_names().await;
        tracing::debug!(
            component = %component.name(),
            constants = ?constants,
            "Booted component from manifest"
        );
    }

    let listing = registry.list().await;
    if listing.is_empty() {
        tracing::warn!("No components declared in configuration");
    }
    for entry in &listing {
        tracing::info!(
            component = %entry.name,
            versions = ?entry.versions,
            "Registered component"
        );
    }

    let registrations = registry.len().await;
    tracing::info!(
        components = listing.len(),
        registrations,
        "Hookloom ready"
    );
    Ok(())
}
