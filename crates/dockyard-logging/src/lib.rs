// ABOUTME: Structured logging for the dockyard crates, built on tokio-tracing
// ABOUTME: One global subscriber per process, with levels adjustable while the shell runs

pub mod config;
pub mod isolation;
pub mod layers;
pub mod reload;
pub mod subscriber;


pub use tracing::{Level, Span, debug, error, info, instrument, span, trace, warn};

pub use config::{ConsoleStyle, LOG_FILE_NAME, LoggingConfig, parse_level};
pub use isolation::{panic_message, report_isolated_failure};
pub use reload::LoggingReloadHandle;
pub use subscriber::{init_subscriber, init_subscriber_with_reload};

use anyhow::{Result, anyhow};
use std::sync::OnceLock;

static RELOAD_HANDLE: OnceLock<LoggingReloadHandle> = OnceLock::new();

/// Install the global subscriber for `config` and remember its reload handle
pub fn init_logging(config: LoggingConfig) -> Result<LoggingReloadHandle> {
    let handle = init_subscriber_with_reload(config)?;
    // Only the first successful init reaches here
    let _ = RELOAD_HANDLE.set(handle.clone());
    Ok(handle)
}

/// Handle of the subscriber installed by [`init_logging`]
pub fn reload_handle() -> Result<&'static LoggingReloadHandle> {
    RELOAD_HANDLE
        .get()
        .ok_or_else(|| anyhow!("Logging was not initialized through init_logging"))
}

pub fn update_log_level(level: Level) -> Result<()> {
    reload_handle()?.update_log_level(level)
}

pub fn update_module_level(module: &str, level: Level) -> Result<()> {
    reload_handle()?.update_module_level(module, level)
}
