// ABOUTME: Loads the shell configuration from dockyard.toml in the config directory
// ABOUTME: Missing files yield defaults; invalid values are sanitized with an error log

use anyhow::Context;
use dockyard_logging::LoggingConfig;
use dockyard_types::{BusConfig, ShellConfig};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "dockyard.toml";

/// `<platform config dir>/dockyard`, or `./dockyard` when the platform has none
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dockyard")
}

/// Load configuration from the standard location
pub fn load() -> anyhow::Result<ShellConfig> {
    load_from_dir(&config_dir())
}

/// Load configuration from a specific directory
pub fn load_from_dir(dir: &Path) -> anyhow::Result<ShellConfig> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    dockyard_logging::info!(
        config_dir = %dir.display(),
        config_path = %config_path.display(),
        config_exists = config_path.exists(),
        "Loading shell configuration"
    );

    let mut config = if config_path.exists() {
        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str::<ShellConfig>(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?
    } else {
        dockyard_logging::info!("No shell configuration file found, using defaults");
        ShellConfig::default()
    };

    if let Err(validation_error) = config.drag.validate() {
        dockyard_logging::error!(
            config_path = %config_path.display(),
            error = %validation_error,
            "Invalid drag configuration - using sanitized values"
        );
        config.drag = config.drag.sanitized();
    }

    if config.bus.any_message_capacity == 0 {
        dockyard_logging::error!(
            config_path = %config_path.display(),
            "bus.any_message_capacity must be positive - using default"
        );
        config.bus.any_message_capacity = BusConfig::default().any_message_capacity;
    }

    dockyard_logging::info!(
        drag_threshold = config.drag.threshold,
        drop_zone_delay_ms = config.drag.drop_zone_delay_ms,
        failsafe_ms = config.drag.failsafe_ms,
        parallel_broadcast = config.bus.parallel_broadcast,
        default_layout = %config.layout.default_kind,
        theme = %config.theme,
        "Loaded shell configuration"
    );

    Ok(config)
}

/// The `[logging]` table of dockyard.toml, if the file has one.
///
/// Read separately from the shell config because logging starts before anything else.
pub fn load_logging_from_dir(dir: &Path) -> anyhow::Result<Option<LoggingConfig>> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }

    let config_str = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let mut table: toml::Table = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    table
        .remove("logging")
        .map(|logging| {
            logging
                .try_into::<LoggingConfig>()
                .with_context(|| format!("Invalid [logging] table in {}", config_path.display()))
        })
        .transpose()
}

/// Directory holding preference files
pub fn preferences_dir(config: &ShellConfig, config_dir: &Path) -> PathBuf {
    config
        .preferences
        .directory
        .clone()
        .unwrap_or_else(|| config_dir.join("preferences"))
}
