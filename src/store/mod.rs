//! Durable key/value settings store

mod file;
mod memory;
mod prefs;
#[cfg(feature = "tauri")]
mod plugin_store;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use prefs::{keys, PreferenceStore, ResumeFlags};
#[cfg(feature = "tauri")]
pub use plugin_store::{TauriStore, PREFERENCES_FILE};

use serde_json::Value;

/// Synchronous durable map. A successful `set` is on disk when it returns.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Write several keys as one record. Backends that can commit atomically
    /// should override this.
    fn set_many(&self, entries: Vec<(&'static str, Value)>) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Config store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write store: {0}")]
    Write(String),

    #[error("Invalid value for '{key}': expected {expected}")]
    InvalidValue { key: String, expected: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
