// ABOUTME: Per-region content providers and the active layout kind
// ABOUTME: Builds fresh layout snapshots and persists only the layout kind preference

use dockyard_events::{EventEmitter, LayoutChanged};
use dockyard_logging::{debug, info, panic_message, report_isolated_failure, warn};
use dockyard_types::{DockableWindow, LayoutKind, LayoutPreference, LayoutSnapshot, Region};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::PreferenceError;
use crate::preferences::PreferenceStore;

/// Preference store key holding the layout kind record
pub const LAYOUT_PREFERENCE_KEY: &str = "layout";

/// Produces the default content of one region
pub type RegionProvider = Arc<dyn Fn() -> Vec<DockableWindow> + Send + Sync>;

pub struct LayoutRegistry {
    providers: [Option<RegionProvider>; 5],
    defaults: [Option<RegionProvider>; 5],
    kind: LayoutKind,
    default_kind: LayoutKind,
    store: Arc<dyn PreferenceStore>,
    changed: EventEmitter<LayoutChanged>,
}

impl LayoutRegistry {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            providers: Default::default(),
            defaults: Default::default(),
            kind: LayoutKind::default(),
            default_kind: LayoutKind::default(),
            store,
            changed: EventEmitter::new("layout_registry"),
        }
    }

    /// Kind used by `reset_to_default` and when no valid preference is stored
    pub fn with_default_kind(mut self, kind: LayoutKind) -> Self {
        self.default_kind = kind;
        self.kind = kind;
        self
    }

    /// Register a built-in provider, restored by `reset_to_default`
    pub fn with_default_provider<F>(mut self, region: Region, provider: F) -> Self
    where
        F: Fn() -> Vec<DockableWindow> + Send + Sync + 'static,
    {
        let provider: RegionProvider = Arc::new(provider);
        self.defaults[region.index()] = Some(provider.clone());
        self.providers[region.index()] = Some(provider);
        self
    }

    /// Replace the content provider of `region`
    pub fn set_provider<F>(&mut self, region: Region, provider: F)
    where
        F: Fn() -> Vec<DockableWindow> + Send + Sync + 'static,
    {
        debug!(region = %region, "Region provider replaced");
        self.providers[region.index()] = Some(Arc::new(provider));
    }

    pub fn clear_provider(&mut self, region: Region) {
        self.providers[region.index()] = None;
    }

    pub fn has_provider(&self, region: Region) -> bool {
        self.providers[region.index()].is_some()
    }

    pub fn layout_kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn default_kind(&self) -> LayoutKind {
        self.default_kind
    }

    /// Set the active kind and notify listeners. Region membership is untouched.
    pub fn set_layout_kind(&mut self, kind: LayoutKind) -> LayoutKind {
        let old = self.kind;
        self.kind = kind;
        info!(new_kind = %kind, old_kind = %old, "Layout kind changed");
        self.changed.emit(&LayoutChanged { new: kind, old });
        old
    }

    /// Run every registered provider into a new snapshot.
    ///
    /// Regions without a provider, and regions whose provider panics, are empty.
    pub fn build_snapshot(&self) -> LayoutSnapshot {
        let mut snapshot = LayoutSnapshot::new(self.kind);
        for region in Region::ALL {
            let Some(provider) = &self.providers[region.index()] else {
                continue;
            };
            match panic::catch_unwind(AssertUnwindSafe(|| provider())) {
                Ok(windows) => snapshot.set_windows(region, windows),
                Err(payload) => {
                    report_isolated_failure("region_provider", region.name(), &panic_message(&*payload));
                }
            }
        }
        debug!(
            layout_kind = %snapshot.layout_kind,
            window_count = snapshot.window_count(),
            "Layout snapshot built"
        );
        snapshot
    }

    /// Drop custom providers, restore the built-in ones and the default kind
    pub fn reset_to_default(&mut self) {
        self.providers = self.defaults.clone();
        info!("Layout providers reset to defaults");
        self.set_layout_kind(self.default_kind);
    }

    /// Save the active kind to the preference store
    pub fn persist_kind_preference(&self) -> Result<(), PreferenceError> {
        let record = LayoutPreference::new(self.kind);
        let json = serde_json::to_string(&record).map_err(|source| {
            PreferenceError::Serialization {
                key: LAYOUT_PREFERENCE_KEY.to_string(),
                source,
            }
        })?;
        self.store.save(LAYOUT_PREFERENCE_KEY, &json)?;
        debug!(layout_kind = %self.kind, "Layout preference persisted");
        Ok(())
    }

    /// Load the stored kind and make it active.
    ///
    /// Missing, unreadable or malformed state selects the default kind.
    pub fn restore_kind_preference(&mut self) -> LayoutKind {
        let kind = self.stored_kind().unwrap_or(self.default_kind);
        self.set_layout_kind(kind);
        kind
    }

    fn stored_kind(&self) -> Option<LayoutKind> {
        let stored = match self.store.load(LAYOUT_PREFERENCE_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!("No stored layout preference");
                return None;
            }
            Err(error) => {
                warn!(error = %error, "Failed to read layout preference, using default");
                return None;
            }
        };

        let record: LayoutPreference = match serde_json::from_str(&stored) {
            Ok(record) => record,
            Err(error) => {
                warn!(error = %error, "Malformed layout preference, using default");
                return None;
            }
        };

        let kind = record.kind();
        if kind.is_none() {
            warn!(stored = %record.layout_kind, "Unknown layout kind in preference, using default");
        }
        kind
    }

    pub fn notifications(&self) -> &EventEmitter<LayoutChanged> {
        &self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{JsonFilePreferenceStore, MemoryPreferenceStore};
    use parking_lot::Mutex;

    fn windows(ids: &[&str]) -> Vec<DockableWindow> {
        ids.iter().map(|id| DockableWindow::new(*id, *id)).collect()
    }

    fn registry() -> LayoutRegistry {
        LayoutRegistry::new(Arc::new(MemoryPreferenceStore::new()))
            .with_default_provider(Region::Left, || windows(&["explorer"]))
            .with_default_provider(Region::Center, || windows(&["editor"]))
    }

    #[test]
    fn test_snapshot_uses_registered_providers() {
        let registry = registry();
        let snapshot = registry.build_snapshot();

        assert_eq!(snapshot.layout_kind, LayoutKind::ThreePane);
        assert_eq!(snapshot.windows(Region::Left)[0].id, "explorer");
        assert_eq!(snapshot.windows(Region::Center)[0].id, "editor");
        assert!(snapshot.windows(Region::Bottom).is_empty());
    }

    #[test]
    fn test_kind_change_keeps_content() {
        let mut registry = registry();
        registry.set_provider(Region::Bottom, || windows(&["output"]));

        let old = registry.set_layout_kind(LayoutKind::FourPane);
        assert_eq!(old, LayoutKind::ThreePane);

        let snapshot = registry.build_snapshot();
        assert_eq!(snapshot.layout_kind, LayoutKind::FourPane);
        assert_eq!(snapshot.windows(Region::Bottom)[0].id, "output");
        assert_eq!(snapshot.window_count(), 3);
    }

    #[test]
    fn test_set_layout_kind_notifies() {
        let mut registry = registry();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        registry
            .notifications()
            .attach("test", move |event: &LayoutChanged| sink.lock().push(*event))
            .unwrap();

        registry.set_layout_kind(LayoutKind::Full);
        registry.set_layout_kind(LayoutKind::Full);

        assert_eq!(
            *events.lock(),
            vec![
                LayoutChanged {
                    new: LayoutKind::Full,
                    old: LayoutKind::ThreePane
                },
                LayoutChanged {
                    new: LayoutKind::Full,
                    old: LayoutKind::Full
                },
            ]
        );
    }

    #[test]
    fn test_panicking_provider_yields_empty_region() {
        let mut registry = registry();
        registry.set_provider(Region::Right, || panic!("provider failed"));

        let snapshot = registry.build_snapshot();
        assert!(snapshot.windows(Region::Right).is_empty());
        assert_eq!(snapshot.windows(Region::Left).len(), 1);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut registry = registry();
        registry.set_provider(Region::Left, || windows(&["custom"]));
        registry.set_provider(Region::Top, || windows(&["toolbar"]));
        registry.set_layout_kind(LayoutKind::Single);

        registry.reset_to_default();

        let snapshot = registry.build_snapshot();
        assert_eq!(registry.layout_kind(), LayoutKind::ThreePane);
        assert_eq!(snapshot.windows(Region::Left)[0].id, "explorer");
        assert!(!registry.has_provider(Region::Top));
    }

    #[test]
    fn test_preference_round_trip() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut registry = LayoutRegistry::new(store.clone());
        registry.set_layout_kind(LayoutKind::FourPane);
        registry.persist_kind_preference().unwrap();

        assert_eq!(
            store.load(LAYOUT_PREFERENCE_KEY).unwrap().as_deref(),
            Some(r#"{"layoutKind":"FourPane"}"#)
        );

        let mut restored = LayoutRegistry::new(store);
        assert_eq!(restored.restore_kind_preference(), LayoutKind::FourPane);
        assert_eq!(restored.layout_kind(), LayoutKind::FourPane);
    }

    #[test]
    fn test_malformed_preference_falls_back() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut registry = LayoutRegistry::new(store.clone());

        assert_eq!(registry.restore_kind_preference(), LayoutKind::ThreePane);

        store.save(LAYOUT_PREFERENCE_KEY, "not json").unwrap();
        registry.set_layout_kind(LayoutKind::Single);
        assert_eq!(registry.restore_kind_preference(), LayoutKind::ThreePane);

        store
            .save(LAYOUT_PREFERENCE_KEY, r#"{"layoutKind":"Sideways"}"#)
            .unwrap();
        assert_eq!(registry.restore_kind_preference(), LayoutKind::ThreePane);
    }

    #[test]
    fn test_configured_default_kind() {
        let mut registry =
            LayoutRegistry::new(Arc::new(MemoryPreferenceStore::new())).with_default_kind(LayoutKind::Full);
        assert_eq!(registry.layout_kind(), LayoutKind::Full);
        assert_eq!(registry.restore_kind_preference(), LayoutKind::Full);
    }

    #[test]
    fn test_file_backed_preference() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(JsonFilePreferenceStore::new(temp_dir.path()));

        let mut registry = LayoutRegistry::new(store.clone());
        registry.set_layout_kind(LayoutKind::TopBottom);
        registry.persist_kind_preference().unwrap();

        let mut restored = LayoutRegistry::new(store);
        assert_eq!(restored.restore_kind_preference(), LayoutKind::TopBottom);
        assert!(temp_dir.path().join("layout.json").exists());
    }
}
