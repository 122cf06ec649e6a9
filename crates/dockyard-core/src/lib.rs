// ABOUTME: Registries and services shared by the workspace and shell layers
// ABOUTME: Window factories, region content providers, preference stores, themes and background work

pub mod error;
pub mod factory;
pub mod layout_registry;
pub mod plugin;
pub mod preferences;
pub mod theme;
pub mod work;

pub use error::{PreferenceError, RegistryError, ThemeError};
pub use factory::{
    FnWindowFactory, WindowFactory, WindowFactoryRegistry, WindowFactoryRegistryBuilder,
};
pub use layout_registry::{LAYOUT_PREFERENCE_KEY, LayoutRegistry, RegionProvider};
pub use plugin::{FactoryConstructor, PluginModule};
pub use preferences::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use theme::{Palette, REQUIRED_COLOR_KEYS, ThemeService};
pub use work::{WorkOutcome, spawn_work};
