// ABOUTME: Opaque key-value preference stores used to persist layout choices
// ABOUTME: In-memory store for tests and embedding, JSON file store for the desktop shell

use dockyard_logging::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PreferenceError;

/// Key-value storage for serialized preference records
pub trait PreferenceStore: Send + Sync {
    /// Stored value for `key`, or `None` when nothing was saved
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError>;

    fn remove(&self, key: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Stores each key as `<directory>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFilePreferenceStore {
    directory: PathBuf,
}

impl JsonFilePreferenceStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PreferenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(PreferenceError::storage(
                key,
                "keys may only contain ASCII letters, digits, '_', '-' and '.'",
            ));
        }
        Ok(self.directory.join(format!("{key}.json")))
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(PreferenceError::io(path, error)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.directory)
            .map_err(|error| PreferenceError::io(self.directory.clone(), error))?;

        // Write then rename so readers never observe a partial file
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|error| PreferenceError::io(staging.clone(), error))?;
        fs::rename(&staging, &path).map_err(|error| PreferenceError::io(path.clone(), error))?;

        debug!(path = %path.display(), "Preference saved");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(PreferenceError::io(path, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.load("layout").unwrap(), None);

        store.save("layout", "{}").unwrap();
        assert_eq!(store.load("layout").unwrap().as_deref(), Some("{}"));

        store.remove("layout").unwrap();
        assert_eq!(store.load("layout").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFilePreferenceStore::new(temp_dir.path().join("prefs"));

        assert_eq!(store.load("layout").unwrap(), None);
        store.save("layout", r#"{"layoutKind":"Full"}"#).unwrap();

        let on_disk = std::fs::read_to_string(temp_dir.path().join("prefs/layout.json")).unwrap();
        assert_eq!(on_disk, r#"{"layoutKind":"Full"}"#);
        assert_eq!(
            store.load("layout").unwrap().as_deref(),
            Some(r#"{"layoutKind":"Full"}"#)
        );

        store.remove("layout").unwrap();
        store.remove("layout").unwrap();
        assert_eq!(store.load("layout").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFilePreferenceStore::new(temp_dir.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                store.save(key, "{}"),
                Err(PreferenceError::Storage { .. })
            ));
        }
    }
}
