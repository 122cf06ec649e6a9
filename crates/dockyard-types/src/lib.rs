// ABOUTME: Pure data types with no cross-crate dependencies
// ABOUTME: Foundation layer for all other dockyard crates

pub mod config;
pub mod region;
pub mod snapshot;
pub mod theme;
pub mod window;

// Re-export commonly used types
pub use config::{BusConfig, DragConfig, LayoutConfig, PreferencesConfig, ShellConfig};
pub use region::{LayoutKind, ParseLayoutKindError, Region};
pub use snapshot::{LayoutPreference, LayoutSnapshot};
pub use theme::ThemeKind;
pub use window::DockableWindow;
