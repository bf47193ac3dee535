//! `tauri-plugin-store` backend

use serde_json::Value;
use std::sync::Arc;
use tauri::{Manager, Runtime};
use tauri_plugin_store::{Store, StoreExt};

use super::{ConfigStore, StoreError};

/// File name of the store inside the app data directory
pub const PREFERENCES_FILE: &str = "proxy_prefs.json";

/// Config store backed by the host app's plugin store
pub struct TauriStore<R: Runtime> {
    store: Arc<Store<R>>,
}

impl<R: Runtime> TauriStore<R> {
    pub fn open<M: Manager<R>>(manager: &M) -> Result<Self, StoreError> {
        let store = manager
            .store(PREFERENCES_FILE)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { store })
    }

    fn save(&self) -> Result<(), StoreError> {
        self.store
            .save()
            .map_err(|e| StoreError::Write(e.to_string()))
    }
}

impl<R: Runtime> ConfigStore for TauriStore<R> {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.store.get(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.store.set(key, value);
        self.save()
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.store.delete(key);
        self.save()
    }

    fn set_many(&self, entries: Vec<(&'static str, Value)>) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.store.set(key, value);
        }
        self.save()
    }
}
