// ABOUTME: Window factory trait and the registry keyed by user-facing window type
// ABOUTME: Feeds category-based population; factory failures are isolated and logged

use dockyard_events::{EventEmitter, FactoryRegistered};
use dockyard_logging::{debug, info, panic_message, report_isolated_failure, warn};
use dockyard_types::{DockableWindow, Region};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::RegistryError;
use crate::plugin::PluginModule;

/// Produces dockable windows of one user-facing type
pub trait WindowFactory: Send + Sync {
    /// Registry key, also the id of single-instance windows
    fn window_id(&self) -> &str;

    fn display_name(&self) -> &str;

    fn category(&self) -> &str;

    /// Region a freshly created window is placed in
    fn default_region(&self) -> Region;

    fn allow_multiple_instances(&self) -> bool {
        false
    }

    /// Build a new window. An empty window id is filled in by the registry.
    fn create(&self) -> anyhow::Result<DockableWindow>;
}

type Constructor = Box<dyn Fn() -> anyhow::Result<DockableWindow> + Send + Sync>;

/// Window factory backed by a closure
pub struct FnWindowFactory {
    window_id: String,
    display_name: String,
    category: String,
    default_region: Region,
    allow_multiple_instances: bool,
    constructor: Constructor,
}

impl FnWindowFactory {
    pub fn new<F>(
        window_id: impl Into<String>,
        display_name: impl Into<String>,
        category: impl Into<String>,
        default_region: Region,
        constructor: F,
    ) -> Self
    where
        F: Fn() -> anyhow::Result<DockableWindow> + Send + Sync + 'static,
    {
        Self {
            window_id: window_id.into(),
            display_name: display_name.into(),
            category: category.into(),
            default_region,
            allow_multiple_instances: false,
            constructor: Box::new(constructor),
        }
    }

    /// Factory whose windows carry no id of their own and use the display name as title
    pub fn titled(
        window_id: impl Into<String>,
        display_name: impl Into<String>,
        category: impl Into<String>,
        default_region: Region,
    ) -> Self {
        let display_name = display_name.into();
        let title = display_name.clone();
        Self::new(window_id, display_name, category, default_region, move || {
            Ok(DockableWindow::new("", title.clone()))
        })
    }

    pub fn multi_instance(mut self) -> Self {
        self.allow_multiple_instances = true;
        self
    }
}

impl WindowFactory for FnWindowFactory {
    fn window_id(&self) -> &str {
        &self.window_id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn default_region(&self) -> Region {
        self.default_region
    }

    fn allow_multiple_instances(&self) -> bool {
        self.allow_multiple_instances
    }

    fn create(&self) -> anyhow::Result<DockableWindow> {
        (self.constructor)()
    }
}

/// Registry of window factories keyed by window id
pub struct WindowFactoryRegistry {
    factories: RwLock<HashMap<String, Arc<dyn WindowFactory>>>,
    registered: EventEmitter<FactoryRegistered>,
}

impl WindowFactoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
            registered: EventEmitter::new("window_factory_registry"),
        }
    }

    /// Register a factory; a factory with the same id is replaced
    pub fn register(&self, factory: Box<dyn WindowFactory>) -> Result<(), RegistryError> {
        let factory: Arc<dyn WindowFactory> = Arc::from(factory);
        let window_id = factory.window_id().to_string();
        if window_id.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "window factory has an empty window_id".to_string(),
            ));
        }

        let replaced = self
            .factories
            .write()
            .insert(window_id.clone(), factory.clone())
            .is_some();

        if replaced {
            warn!(
                window_id = %window_id,
                "Window factory already registered, replacing existing"
            );
        } else {
            info!(
                window_id = %window_id,
                category = %factory.category(),
                default_region = %factory.default_region(),
                multi_instance = factory.allow_multiple_instances(),
                "Registered window factory"
            );
        }

        self.registered
            .emit(&FactoryRegistered { window_id, replaced });
        Ok(())
    }

    /// Register every factory a plugin module can construct.
    ///
    /// Constructors that fail or panic are logged and skipped. Returns the
    /// number of factories registered.
    pub fn discover_from(&self, module: &PluginModule) -> usize {
        debug!(module = %module.name(), candidates = module.len(), "Discovering window factories");

        let mut registered = 0;
        for (name, constructor) in module.constructors() {
            let source = format!("{}::{}", module.name(), name);
            let factory = match panic::catch_unwind(AssertUnwindSafe(|| constructor())) {
                Ok(Ok(factory)) => factory,
                Ok(Err(error)) => {
                    report_isolated_failure("factory_discovery", &source, &format!("{error:#}"));
                    continue;
                }
                Err(payload) => {
                    report_isolated_failure("factory_discovery", &source, &panic_message(&*payload));
                    continue;
                }
            };

            match self.register(factory) {
                Ok(()) => registered += 1,
                Err(error) => {
                    report_isolated_failure("factory_discovery", &source, &error.to_string());
                }
            }
        }

        info!(module = %module.name(), registered, "Window factory discovery completed");
        registered
    }

    /// Create a window from the factory registered under `window_id`.
    ///
    /// Returns `None` for unknown ids and when the factory fails.
    pub fn create(&self, window_id: &str) -> Option<DockableWindow> {
        let Some(factory) = self.get(window_id) else {
            debug!(window_id = %window_id, "No window factory registered");
            return None;
        };

        let mut window = match panic::catch_unwind(AssertUnwindSafe(|| factory.create())) {
            Ok(Ok(window)) => window,
            Ok(Err(error)) => {
                report_isolated_failure("window_factory", window_id, &format!("{error:#}"));
                return None;
            }
            Err(payload) => {
                report_isolated_failure("window_factory", window_id, &panic_message(&*payload));
                return None;
            }
        };

        if !window.has_id() {
            window.id = if factory.allow_multiple_instances() {
                format!("{}_{}", factory.window_id(), uuid::Uuid::new_v4())
            } else {
                factory.window_id().to_string()
            };
        }

        debug!(window_id = %window_id, instance_id = %window.id, "Created window");
        Some(window)
    }

    /// Factories in `category`, ordered by display name. Unknown categories yield nothing.
    pub fn list_by_category(&self, category: &str) -> Vec<Arc<dyn WindowFactory>> {
        let mut matching: Vec<Arc<dyn WindowFactory>> = self
            .factories
            .read()
            .values()
            .filter(|factory| factory.category() == category)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.display_name()
                .cmp(b.display_name())
                .then_with(|| a.window_id().cmp(b.window_id()))
        });
        matching
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .factories
            .read()
            .values()
            .map(|factory| factory.category().to_string())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn get(&self, window_id: &str) -> Option<Arc<dyn WindowFactory>> {
        self.factories.read().get(window_id).cloned()
    }

    pub fn contains(&self, window_id: &str) -> bool {
        self.factories.read().contains_key(window_id)
    }

    pub fn count(&self) -> usize {
        self.factories.read().len()
    }

    pub fn unregister(&self, window_id: &str) -> Result<(), RegistryError> {
        match self.factories.write().remove(window_id) {
            Some(_) => {
                info!(window_id = %window_id, "Unregistered window factory");
                Ok(())
            }
            None => Err(RegistryError::factory_not_found(window_id)),
        }
    }

    /// Registration notifications
    pub fn notifications(&self) -> &EventEmitter<FactoryRegistered> {
        &self.registered
    }
}

impl Default for WindowFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a registry populated at startup
pub struct WindowFactoryRegistryBuilder {
    factories: Vec<Box<dyn WindowFactory>>,
    modules: Vec<PluginModule>,
}

impl WindowFactoryRegistryBuilder {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub fn with_factory(mut self, factory: impl WindowFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    pub fn with_module(mut self, module: PluginModule) -> Self {
        self.modules.push(module);
        self
    }

    /// Build the registry. Factories with invalid ids are logged and skipped.
    pub fn build(self) -> Arc<WindowFactoryRegistry> {
        let registry = Arc::new(WindowFactoryRegistry::new());
        for factory in self.factories {
            let window_id = factory.window_id().to_string();
            if let Err(error) = registry.register(factory) {
                warn!(window_id = %window_id, error = %error, "Skipping invalid window factory");
            }
        }
        for module in &self.modules {
            registry.discover_from(module);
        }
        registry
    }
}

impl Default for WindowFactoryRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn tool(window_id: &str, display_name: &str) -> FnWindowFactory {
        FnWindowFactory::titled(window_id, display_name, "Tools", Region::Bottom)
    }

    #[test]
    fn test_registration_and_lookup() {
        let registry = WindowFactoryRegistry::new();
        assert_eq!(registry.count(), 0);

        registry.register(Box::new(tool("output", "Output"))).unwrap();

        assert!(registry.contains("output"));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get("output").unwrap().display_name(), "Output");
    }

    #[test]
    fn test_empty_window_id_rejected() {
        let registry = WindowFactoryRegistry::new();
        let result = registry.register(Box::new(tool("", "Nameless")));
        assert!(matches!(result, Err(RegistryError::InvalidArgument(_))));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_replacement_notifies() {
        let registry = WindowFactoryRegistry::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        registry
            .notifications()
            .attach("test", move |event: &FactoryRegistered| sink.lock().push(event.clone()))
            .unwrap();

        registry.register(Box::new(tool("output", "Output"))).unwrap();
        registry
            .register(Box::new(tool("output", "Build Output")))
            .unwrap();

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get("output").unwrap().display_name(), "Build Output");
        assert_eq!(registry.create("output").unwrap().title, "Build Output");
        assert_eq!(
            *events.lock(),
            vec![
                FactoryRegistered {
                    window_id: "output".into(),
                    replaced: false
                },
                FactoryRegistered {
                    window_id: "output".into(),
                    replaced: true
                },
            ]
        );
    }

    #[test]
    fn test_create_unknown_returns_none() {
        let registry = WindowFactoryRegistry::new();
        assert!(registry.create("missing").is_none());
    }

    #[test]
    fn test_single_and_multi_instance_ids() {
        let registry = WindowFactoryRegistry::new();
        registry.register(Box::new(tool("a", "A"))).unwrap();
        registry
            .register(Box::new(tool("b", "B").multi_instance()))
            .unwrap();

        let a1 = registry.create("a").unwrap();
        let a2 = registry.create("a").unwrap();
        assert_eq!(a1.id, "a");
        assert_eq!(a1.id, a2.id);

        let b1 = registry.create("b").unwrap();
        let b2 = registry.create("b").unwrap();
        assert_ne!(b1.id, b2.id);
        assert!(b1.id.starts_with("b_"));
        assert_eq!(b1.title, "B");
    }

    #[test]
    fn test_factory_supplied_id_is_kept() {
        let registry = WindowFactoryRegistry::new();
        registry
            .register(Box::new(FnWindowFactory::new(
                "props",
                "Properties",
                "Inspect",
                Region::Right,
                || Ok(DockableWindow::new("properties-main", "Properties")),
            )))
            .unwrap();

        assert_eq!(registry.create("props").unwrap().id, "properties-main");
    }

    #[test]
    fn test_failing_create_is_isolated() {
        let registry = WindowFactoryRegistry::new();
        registry
            .register(Box::new(FnWindowFactory::new(
                "broken",
                "Broken",
                "Tools",
                Region::Left,
                || Err(anyhow::anyhow!("resource missing")),
            )))
            .unwrap();
        registry
            .register(Box::new(FnWindowFactory::new(
                "panicky",
                "Panicky",
                "Tools",
                Region::Left,
                || panic!("constructor panicked"),
            )))
            .unwrap();

        assert!(registry.create("broken").is_none());
        assert!(registry.create("panicky").is_none());
    }

    #[test]
    fn test_list_by_category() {
        let registry = WindowFactoryRegistry::new();
        registry.register(Box::new(tool("b", "Beta"))).unwrap();
        registry.register(Box::new(tool("a", "Alpha"))).unwrap();
        registry
            .register(Box::new(FnWindowFactory::titled(
                "explorer",
                "Explorer",
                "Navigation",
                Region::Left,
            )))
            .unwrap();

        let tools: Vec<String> = registry
            .list_by_category("Tools")
            .iter()
            .map(|f| f.window_id().to_string())
            .collect();
        assert_eq!(tools, vec!["a", "b"]);
        assert!(registry.list_by_category("Unknown").is_empty());
        assert_eq!(registry.categories(), vec!["Navigation", "Tools"]);
    }

    #[test]
    fn test_discovery_skips_failing_candidates() {
        let module = PluginModule::new("builtin")
            .with_factory("output", || tool("output", "Output"))
            .with_constructor("broken", || Err(anyhow::anyhow!("missing dependency")))
            .with_constructor("panics", || panic!("constructor exploded"))
            .with_factory("nameless", || tool("", "Nameless"))
            .with_factory("errors", || tool("errors", "Errors"));

        let registry = WindowFactoryRegistry::new();
        assert_eq!(registry.discover_from(&module), 2);
        assert!(registry.contains("output"));
        assert!(registry.contains("errors"));
    }

    #[test]
    fn test_unregister() {
        let registry = WindowFactoryRegistry::new();
        registry.register(Box::new(tool("output", "Output"))).unwrap();

        assert!(registry.unregister("output").is_ok());
        assert_eq!(
            registry.unregister("output"),
            Err(RegistryError::factory_not_found("output"))
        );
    }

    #[test]
    fn test_builder() {
        let registry = WindowFactoryRegistryBuilder::new()
            .with_factory(tool("output", "Output"))
            .with_factory(tool("", "Invalid"))
            .with_module(PluginModule::new("extra").with_factory("errors", || tool("errors", "Errors")))
            .build();

        assert_eq!(registry.count(), 2);
    }
}
