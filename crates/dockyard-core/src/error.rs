// ABOUTME: Error types for registries, preference stores and the theme service
// ABOUTME: Isolated failures (factory, provider) are logged instead and never appear here

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Window factory '{window_id}' not found")]
    FactoryNotFound { window_id: String },
}

impl RegistryError {
    pub fn factory_not_found<S: Into<String>>(window_id: S) -> Self {
        Self::FactoryNotFound {
            window_id: window_id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("IO error for preference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize preference '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preference storage failed for '{key}': {reason}")]
    Storage { key: String, reason: String },
}

impl PreferenceError {
    pub fn io(path: PathBuf, source: std::io::Error) -> Self {
        Self::Io { path, source }
    }

    pub fn storage<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::Storage {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("Palette for {theme} is missing required keys: {}", missing.join(", "))]
    MissingKeys { theme: String, missing: Vec<String> },
}
