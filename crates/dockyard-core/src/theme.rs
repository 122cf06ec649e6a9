// ABOUTME: Theme service swapping key-to-color palettes for the shell chrome
// ABOUTME: Palettes must cover every required key; changes are announced through an emitter

use dockyard_events::{EventEmitter, ThemeChanged};
use dockyard_logging::info;
use dockyard_types::ThemeKind;
use std::collections::BTreeMap;

use crate::error::ThemeError;

/// Keys every palette must define
pub const REQUIRED_COLOR_KEYS: &[&str] = &[
    "background",
    "foreground",
    "accent",
    "border",
    "panel.background",
    "tab.active",
    "tab.inactive",
    "drop_zone",
];

/// Color dictionary keyed by chrome element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: BTreeMap<String, String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, key: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(key.into(), color.into());
        self
    }

    pub fn light() -> Self {
        Self::new()
            .with_color("background", "#ffffff")
            .with_color("foreground", "#1f2328")
            .with_color("accent", "#0969da")
            .with_color("border", "#d0d7de")
            .with_color("panel.background", "#f6f8fa")
            .with_color("tab.active", "#ffffff")
            .with_color("tab.inactive", "#eaeef2")
            .with_color("drop_zone", "#0969da40")
    }

    pub fn dark() -> Self {
        Self::new()
            .with_color("background", "#0d1117")
            .with_color("foreground", "#e6edf3")
            .with_color("accent", "#2f81f7")
            .with_color("border", "#30363d")
            .with_color("panel.background", "#161b22")
            .with_color("tab.active", "#0d1117")
            .with_color("tab.inactive", "#21262d")
            .with_color("drop_zone", "#2f81f740")
    }

    pub fn builtin(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Light => Self::light(),
            ThemeKind::Dark => Self::dark(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.colors.get(key).map(String::as_str)
    }

    pub fn missing_keys(&self) -> Vec<String> {
        REQUIRED_COLOR_KEYS
            .iter()
            .filter(|key| !self.colors.contains_key(**key))
            .map(|key| key.to_string())
            .collect()
    }
}

pub struct ThemeService {
    active: ThemeKind,
    palette: Palette,
    changed: EventEmitter<ThemeChanged>,
}

impl ThemeService {
    pub fn new(kind: ThemeKind) -> Self {
        Self {
            active: kind,
            palette: Palette::builtin(kind),
            changed: EventEmitter::new("theme_service"),
        }
    }

    pub fn active(&self) -> ThemeKind {
        self.active
    }

    pub fn color(&self, key: &str) -> Option<&str> {
        self.palette.get(key)
    }

    /// Switch to a built-in palette
    pub fn set_theme(&mut self, kind: ThemeKind) {
        self.apply(kind, Palette::builtin(kind));
    }

    /// Switch to a custom palette, rejecting it if required keys are missing
    pub fn set_theme_with_palette(
        &mut self,
        kind: ThemeKind,
        palette: Palette,
    ) -> Result<(), ThemeError> {
        let missing = palette.missing_keys();
        if !missing.is_empty() {
            return Err(ThemeError::MissingKeys {
                theme: kind.to_string(),
                missing,
            });
        }
        self.apply(kind, palette);
        Ok(())
    }

    pub fn toggle(&mut self) -> ThemeKind {
        let next = self.active.toggled();
        self.set_theme(next);
        next
    }

    fn apply(&mut self, kind: ThemeKind, palette: Palette) {
        let old = self.active;
        self.active = kind;
        self.palette = palette;
        info!(old_theme = %old, new_theme = %kind, "Theme changed");
        self.changed.emit(&ThemeChanged { old, new: kind });
    }

    pub fn notifications(&self) -> &EventEmitter<ThemeChanged> {
        &self.changed
    }
}

impl Default for ThemeService {
    fn default() -> Self {
        Self::new(ThemeKind::default())
    }
}
