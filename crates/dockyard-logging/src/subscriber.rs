// ABOUTME: Tracing subscriber initialization and layer composition
// ABOUTME: Combines the configured output layers with a plain or reloadable env filter

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, Registry, layer::Layered, prelude::*, reload, util::SubscriberInitExt,
};

use crate::config::LoggingConfig;
use crate::layers::{env_filter, output_layers};
use crate::reload::LoggingReloadHandle;

type FilteredRegistry = Layered<EnvFilter, Registry>;
type ReloadableRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;

/// Initialize the global tracing subscriber with the given configuration.
pub fn init_subscriber(config: LoggingConfig) -> Result<()> {
    let env_filter = env_filter(&config).context("Failed to create environment filter")?;
    let layers = output_layers::<FilteredRegistry>(&config)?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    log_initialized(&config, false);
    Ok(())
}

/// Initialize the global tracing subscriber with hot-reload support.
///
/// Returns a LoggingReloadHandle that can be used to update log levels at runtime.
pub fn init_subscriber_with_reload(config: LoggingConfig) -> Result<LoggingReloadHandle> {
    let env_filter = env_filter(&config).context("Failed to create environment filter")?;
    let (filter_layer, filter_handle) = reload::Layer::new(env_filter);
    let layers = output_layers::<ReloadableRegistry>(&config)?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(layers)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    log_initialized(&config, true);
    Ok(LoggingReloadHandle::new(filter_handle, config))
}

fn log_initialized(config: &LoggingConfig, reload_enabled: bool) {
    tracing::info!(
        log_level = %config.level,
        directives = ?config.directives,
        console = ?config.console,
        json_output = config.json,
        file_path = ?config.file,
        reload_enabled,
        "Dockyard logging initialized"
    );
}
