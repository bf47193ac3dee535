//! In-process store

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

use super::{ConfigStore, StoreError};

/// Volatile store backed by a map. Used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.write().remove(key);
        Ok(())
    }

    fn set_many(&self, entries: Vec<(&'static str, Value)>) -> Result<(), StoreError> {
        let mut values = self.values.write();
        for (key, value) in entries {
            values.insert(key.to_string(), value);
        }
        Ok(())
    }
}
