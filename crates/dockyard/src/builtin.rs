// ABOUTME: Built-in window factories and default region content for the demo shell
// ABOUTME: Registered through an explicit plugin module rather than discovered at runtime

use dockyard_core::{FnWindowFactory, LayoutRegistry, PluginModule, PreferenceStore};
use dockyard_types::{DockableWindow, LayoutKind, Region};
use std::sync::Arc;

pub const NAVIGATION: &str = "Navigation";
pub const DOCUMENTS: &str = "Documents";
pub const TOOLS: &str = "Tools";
pub const CHROME: &str = "Chrome";

/// Factories shipped with the shell
pub fn builtin_module() -> PluginModule {
    PluginModule::new("builtin")
        .with_factory("explorer", || {
            FnWindowFactory::new("explorer", "Explorer", NAVIGATION, Region::Left, || {
                Ok(DockableWindow::new("", "Explorer")
                    .with_description("Browse the project tree")
                    .closable(false))
            })
        })
        .with_factory("outline", || {
            FnWindowFactory::titled("outline", "Outline", NAVIGATION, Region::Left)
        })
        .with_factory("editor", || {
            FnWindowFactory::new("editor", "Editor", DOCUMENTS, Region::Center, || {
                Ok(DockableWindow::new("", "Untitled")
                    .with_content(serde_json::json!({ "text": "" }))
                    .floatable(false))
            })
            .multi_instance()
        })
        .with_factory("properties", || {
            FnWindowFactory::titled("properties", "Properties", TOOLS, Region::Right)
        })
        .with_factory("output", || {
            FnWindowFactory::titled("output", "Output", TOOLS, Region::Bottom)
        })
        .with_factory("errors", || {
            FnWindowFactory::titled("errors", "Error List", TOOLS, Region::Bottom)
        })
        .with_factory("terminal", || {
            FnWindowFactory::titled("terminal", "Terminal", TOOLS, Region::Bottom).multi_instance()
        })
        .with_factory("toolbar", || {
            FnWindowFactory::new("toolbar", "Toolbar", CHROME, Region::Top, || {
                Ok(DockableWindow::new("", "Toolbar").closable(false).floatable(false))
            })
        })
}

/// Layout registry with the default content of each region
pub fn default_layout(store: Arc<dyn PreferenceStore>, default_kind: LayoutKind) -> LayoutRegistry {
    LayoutRegistry::new(store)
        .with_default_kind(default_kind)
        .with_default_provider(Region::Left, || {
            vec![
                DockableWindow::new("explorer", "Explorer").closable(false),
                DockableWindow::new("outline", "Outline"),
            ]
        })
        .with_default_provider(Region::Right, || {
            vec![DockableWindow::new("properties", "Properties")]
        })
        .with_default_provider(Region::Center, || {
            vec![DockableWindow::new("welcome", "Welcome").with_description("Start page")]
        })
        .with_default_provider(Region::Bottom, || {
            vec![DockableWindow::new("output", "Output")]
        })
        .with_default_provider(Region::Top, || {
            vec![
                DockableWindow::new("toolbar", "Toolbar")
                    .closable(false)
                    .floatable(false),
            ]
        })
}
