// ABOUTME: Configuration data types for the shell
// ABOUTME: Pure data structures deserialized from dockyard.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::region::LayoutKind;
use crate::theme::ThemeKind;

/// Top-level shell configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub drag: DragConfig,

    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    /// Theme applied at startup
    #[serde(default)]
    pub theme: ThemeKind,
}

/// Drag-and-drop tuning for docking surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// Pointer travel (logical pixels) before an armed press becomes a drag
    #[serde(default = "default_drag_threshold")]
    pub threshold: f32,

    /// Continuous hover time before the drop-zone indicator appears
    #[serde(default = "default_drop_zone_delay_ms")]
    pub drop_zone_delay_ms: u64,

    /// Time without drag events after which a surface force-resets
    #[serde(default = "default_failsafe_ms")]
    pub failsafe_ms: u64,
}

fn default_drag_threshold() -> f32 {
    4.0
}

fn default_drop_zone_delay_ms() -> u64 {
    100
}

fn default_failsafe_ms() -> u64 {
    5000
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            threshold: default_drag_threshold(),
            drop_zone_delay_ms: default_drop_zone_delay_ms(),
            failsafe_ms: default_failsafe_ms(),
        }
    }
}

impl DragConfig {
    pub fn drop_zone_delay(&self) -> Duration {
        Duration::from_millis(self.drop_zone_delay_ms)
    }

    pub fn failsafe(&self) -> Duration {
        Duration::from_millis(self.failsafe_ms)
    }

    /// Validate the drag configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(format!("drag threshold must be >= 0, got {}", self.threshold));
        }
        if self.failsafe_ms <= self.drop_zone_delay_ms {
            return Err(format!(
                "failsafe_ms ({}) must exceed drop_zone_delay_ms ({})",
                self.failsafe_ms, self.drop_zone_delay_ms
            ));
        }
        Ok(())
    }

    /// Replace invalid values with defaults
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut sanitized = self.clone();
        if !sanitized.threshold.is_finite() || sanitized.threshold < 0.0 {
            sanitized.threshold = defaults.threshold;
        }
        if sanitized.failsafe_ms <= sanitized.drop_zone_delay_ms {
            sanitized.drop_zone_delay_ms = defaults.drop_zone_delay_ms;
            sanitized.failsafe_ms = defaults.failsafe_ms;
        }
        sanitized
    }
}

/// Message bus behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Run worker-context handlers of a broadcast concurrently
    #[serde(default = "default_true")]
    pub parallel_broadcast: bool,

    /// Fewest worker-context recipients a broadcast needs before it runs them
    /// concurrently; smaller fan-outs stay on the publishing thread
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Buffered messages kept for slow "any message" observers
    #[serde(default = "default_any_message_capacity")]
    pub any_message_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_parallel_threshold() -> usize {
    4
}

fn default_any_message_capacity() -> usize {
    256
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            parallel_broadcast: true,
            parallel_threshold: default_parallel_threshold(),
            any_message_capacity: default_any_message_capacity(),
        }
    }
}

/// Layout defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Kind used when no preference has been stored
    #[serde(default)]
    pub default_kind: LayoutKind,
}

/// Where layout preferences are stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Directory for preference files (defaults to the config directory)
    #[serde(default)]
    pub directory: Option<PathBuf>,
}
