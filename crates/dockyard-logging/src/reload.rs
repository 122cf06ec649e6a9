// ABOUTME: Handle for changing log levels while the shell is running
// ABOUTME: Rebuilds the env filter from the stored config and swaps it into the reload layer

use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Registry, reload};

use crate::config::LoggingConfig;
use crate::layers::env_filter;

#[derive(Clone)]
pub struct LoggingReloadHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    config: Arc<RwLock<LoggingConfig>>,
}

impl LoggingReloadHandle {
    pub fn new(filter: reload::Handle<EnvFilter, Registry>, config: LoggingConfig) -> Self {
        Self {
            filter,
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub fn update_log_level(&self, level: Level) -> Result<()> {
        self.update(|config| config.level = level)?;
        tracing::info!(level = %level, "Log level changed");
        Ok(())
    }

    pub fn update_module_level(&self, module: &str, level: Level) -> Result<()> {
        self.update(|config| config.set_target_level(module, level))?;
        tracing::info!(module = %module, level = %level, "Module log level changed");
        Ok(())
    }

    /// Re-read levels from the environment. Outputs cannot change after init and are kept.
    pub fn reload_from_env(&self) -> Result<()> {
        let fresh = LoggingConfig::from_env().context("Failed to read logging environment")?;
        self.update(|config| {
            config.level = fresh.level;
            config.directives = fresh.directives.clone();
        })?;
        tracing::info!(level = %fresh.level, "Log levels reloaded from environment");
        Ok(())
    }

    pub fn current_config(&self) -> LoggingConfig {
        self.config.read().clone()
    }

    /// Apply `change` to a copy; the stored config only changes if the reload succeeds
    fn update(&self, change: impl FnOnce(&mut LoggingConfig)) -> Result<()> {
        let mut config = self.config.write();
        let mut updated = config.clone();
        change(&mut updated);

        let filter = env_filter(&updated)?;
        self.filter
            .reload(filter)
            .context("Failed to swap the log filter")?;
        *config = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    fn handle_with_subscriber() -> (LoggingReloadHandle, impl tracing::Subscriber + Send + Sync) {
        let config = LoggingConfig::default();
        let (filter_layer, filter) = reload::Layer::new(env_filter(&config).unwrap());
        let subscriber = tracing_subscriber::registry().with(filter_layer);
        (LoggingReloadHandle::new(filter, config), subscriber)
    }

    #[test]
    fn test_update_levels_through_handle() {
        let (handle, subscriber) = handle_with_subscriber();

        tracing::subscriber::with_default(subscriber, || {
            handle.update_log_level(Level::DEBUG).unwrap();
            handle
                .update_module_level("dockyard_workspace", Level::TRACE)
                .unwrap();
        });

        let current = handle.current_config();
        assert_eq!(current.level, Level::DEBUG);
        assert_eq!(current.target_level("dockyard_workspace"), Some(Level::TRACE));
    }
}
