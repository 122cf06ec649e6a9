// ABOUTME: Logging settings: level, per-target filter directives and output selection
// ABOUTME: Deserializable from the [logging] table of dockyard.toml and overridable from the environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::Level;

/// File name used when logging into a directory
pub const LOG_FILE_NAME: &str = "dockyard.log";

/// How events are written to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStyle {
    Off,
    #[default]
    Compact,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    #[serde(with = "level_name")]
    pub level: Level,

    /// Extra `target=level` directives, e.g. `dockyard_events=trace`
    pub directives: Vec<String>,

    pub console: ConsoleStyle,

    /// Emit JSON lines on stdout in addition to the console layer
    pub json: bool,

    /// Daily-rolling log file; `None` disables file output
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            directives: Vec::new(),
            console: ConsoleStyle::Compact,
            json: false,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Level for a `-v` count: warn, info, debug, then trace
    pub fn for_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Self::default()
        }
    }

    /// Also write to `<dir>/dockyard.log`
    pub fn with_file_in(mut self, dir: &Path) -> Self {
        self.file = Some(dir.join(LOG_FILE_NAME));
        self
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `DOCKYARD_LOG*` and `RUST_LOG` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    ///
    /// `DOCKYARD_LOG` (a single level) wins over `RUST_LOG` (level plus directives).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(level) = lookup("DOCKYARD_LOG") {
            self.level = parse_level(&level).context("Invalid DOCKYARD_LOG level")?;
        } else if let Some(rust_log) = lookup("RUST_LOG") {
            self.apply_rust_log(&rust_log)?;
        }

        if lookup("DOCKYARD_LOG_JSON").is_some() {
            self.json = true;
        }
        if lookup("DOCKYARD_LOG_NO_CONSOLE").is_some() {
            self.console = ConsoleStyle::Off;
        }
        if let Some(path) = lookup("DOCKYARD_LOG_FILE") {
            self.file = Some(PathBuf::from(path));
        }
        if lookup("DOCKYARD_LOG_NO_FILE").is_some() {
            self.file = None;
        }
        Ok(())
    }

    /// Set or replace the directive for `target`
    pub fn set_target_level(&mut self, target: &str, level: Level) {
        self.directives
            .retain(|directive| directive_target(directive) != Some(target));
        self.directives
            .push(format!("{target}={}", level_name::lowercase(&level)));
    }

    /// Level of the directive for `target`, if one is set
    pub fn target_level(&self, target: &str) -> Option<Level> {
        self.directives.iter().rev().find_map(|directive| {
            let (name, level) = directive.split_once('=')?;
            (name.trim() == target).then(|| parse_level(level).ok()).flatten()
        })
    }

    fn apply_rust_log(&mut self, rust_log: &str) -> Result<()> {
        for directive in rust_log.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((target, level)) => {
                    let level = parse_level(level)
                        .with_context(|| format!("Invalid RUST_LOG directive '{directive}'"))?;
                    self.set_target_level(target.trim(), level);
                }
                None => {
                    self.level = parse_level(directive)
                        .with_context(|| format!("Invalid RUST_LOG level '{directive}'"))?;
                }
            }
        }
        Ok(())
    }
}

fn directive_target(directive: &str) -> Option<&str> {
    directive.split_once('=').map(|(target, _)| target.trim())
}

/// Parse a level name, case-insensitive; `warning` is accepted for `warn`
pub fn parse_level(name: &str) -> Result<Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Unknown log level '{name}', expected trace, debug, info, warn or error"),
    }
}

mod level_name {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use tracing::Level;

    pub fn lowercase(level: &Level) -> String {
        level.as_str().to_ascii_lowercase()
    }

    pub fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&lowercase(level))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let name = String::deserialize(deserializer)?;
        super::parse_level(&name).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(LoggingConfig::for_verbosity(0).level, Level::WARN);
        assert_eq!(LoggingConfig::for_verbosity(1).level, Level::INFO);
        assert_eq!(LoggingConfig::for_verbosity(2).level, Level::DEBUG);
        assert_eq!(LoggingConfig::for_verbosity(9).level, Level::TRACE);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_level(" Warning ").unwrap(), Level::WARN);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_dockyard_log_wins_over_rust_log() {
        let mut config = LoggingConfig::default();
        config
            .apply_overrides(lookup(&[("DOCKYARD_LOG", "error"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.level, Level::ERROR);
        assert!(config.directives.is_empty());
    }

    #[test]
    fn test_rust_log_directives() {
        let mut config = LoggingConfig::default();
        config
            .apply_overrides(lookup(&[(
                "RUST_LOG",
                "warn,dockyard_events=debug,dockyard_events=trace, dockyard_workspace=info",
            )]))
            .unwrap();

        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.directives.len(), 2);
        assert_eq!(config.target_level("dockyard_events"), Some(Level::TRACE));
        assert_eq!(config.target_level("dockyard_workspace"), Some(Level::INFO));
        assert_eq!(config.target_level("dockyard_core"), None);

        let mut config = LoggingConfig::default();
        assert!(
            config
                .apply_overrides(lookup(&[("RUST_LOG", "dockyard_core=chatty")]))
                .is_err()
        );
    }

    #[test]
    fn test_output_overrides() {
        let dir = Path::new("/tmp/dockyard-logs");
        let mut config = LoggingConfig::default().with_file_in(dir);
        assert_eq!(config.file, Some(dir.join(LOG_FILE_NAME)));

        config
            .apply_overrides(lookup(&[
                ("DOCKYARD_LOG_JSON", "1"),
                ("DOCKYARD_LOG_NO_CONSOLE", "1"),
                ("DOCKYARD_LOG_NO_FILE", "1"),
            ]))
            .unwrap();
        assert!(config.json);
        assert_eq!(config.console, ConsoleStyle::Off);
        assert_eq!(config.file, None);
    }
}
