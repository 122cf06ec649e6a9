// ABOUTME: Output layers for the console, rolling log file and JSON lines
// ABOUTME: Layers are boxed and generic over the subscriber so they stack on either filter kind

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    registry::LookupSpan,
};

use crate::config::{ConsoleStyle, LoggingConfig};

pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

pub fn console_layer<S>(style: ConsoleStyle) -> Option<BoxedLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    match style {
        ConsoleStyle::Off => None,
        ConsoleStyle::Compact => Some(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .compact()
                .boxed(),
        ),
        ConsoleStyle::Pretty => Some(
            fmt::layer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .pretty()
                .boxed(),
        ),
    }
}

/// Daily-rolling file layer writing next to `path`, creating its directory
pub fn file_layer<S>(path: &Path) -> Result<BoxedLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path {} has no file name", path.display()))?;

    let (writer, guard) = non_blocking(rolling::daily(directory, file_name));
    // Dropping the guard stops the writer thread; logging lasts for the whole process
    std::mem::forget(guard);

    Ok(fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .boxed())
}

pub fn json_layer<S>() -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    fmt::layer()
        .json()
        .with_target(true)
        .with_thread_names(true)
        .boxed()
}

/// Every output enabled by `config`
pub fn output_layers<S>(config: &LoggingConfig) -> Result<Vec<BoxedLayer<S>>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let mut layers: Vec<BoxedLayer<S>> = Vec::new();
    layers.extend(console_layer(config.console));
    if let Some(path) = &config.file {
        layers.push(file_layer(path)?);
    }
    if config.json {
        layers.push(json_layer());
    }
    Ok(layers)
}

/// Filter from the global level plus every target directive
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::new(config.level.as_str());
    for directive in &config.directives {
        let directive: Directive = directive
            .parse()
            .with_context(|| format!("Invalid log directive '{directive}'"))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tracing::Level;
    use tracing_subscriber::Registry;

    #[test]
    fn test_console_styles() {
        assert!(console_layer::<Registry>(ConsoleStyle::Off).is_none());
        assert!(console_layer::<Registry>(ConsoleStyle::Compact).is_some());
        assert!(console_layer::<Registry>(ConsoleStyle::Pretty).is_some());
    }

    #[test]
    fn test_file_layer_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let log_path = temp_dir.path().join("nested").join("shell.log");

        assert!(file_layer::<Registry>(&log_path).is_ok());
        assert!(temp_dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_output_layers_follow_config() {
        let temp_dir = tempdir().unwrap();
        let config = LoggingConfig {
            console: ConsoleStyle::Off,
            json: true,
            ..LoggingConfig::default().with_file_in(temp_dir.path())
        };
        assert_eq!(output_layers::<Registry>(&config).unwrap().len(), 2);

        let config = LoggingConfig {
            console: ConsoleStyle::Off,
            ..LoggingConfig::default()
        };
        assert!(output_layers::<Registry>(&config).unwrap().is_empty());
    }

    #[test]
    fn test_env_filter_rejects_bad_directive() {
        let mut config = LoggingConfig::for_verbosity(2);
        config.set_target_level("dockyard_events", Level::TRACE);
        assert!(env_filter(&config).is_ok());

        config.directives.push("dockyard_core=loud".to_string());
        assert!(env_filter(&config).is_err());
    }
}
