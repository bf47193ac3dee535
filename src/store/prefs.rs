//! Typed access to the persisted proxy settings

use serde_json::{json, Value};
use std::sync::Arc;

use super::{ConfigStore, StoreError};
use crate::proxy::{ProxyConfig, DEFAULT_HTTP_PORT, DEFAULT_SOCKS5_PORT};

/// Persisted record layout
pub mod keys {
    pub const HTTP_PORT: &str = "http_port";
    pub const SOCKS5_PORT: &str = "socks5_port";
    pub const HTTP_ENABLED: &str = "http_enabled";
    pub const SOCKS5_ENABLED: &str = "socks5_enabled";
    pub const HTTP_ACTIVE: &str = "http_active";
    pub const SOCKS5_ACTIVE: &str = "socks5_active";
    pub const SELECTED_IP: &str = "selected_ip";
}

/// Active flags left behind by the previous run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResumeFlags {
    pub http: bool,
    pub socks5: bool,
}

impl ResumeFlags {
    pub fn any(&self) -> bool {
        self.http || self.socks5
    }
}

/// Settings facade over an injected [`ConfigStore`]
#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn ConfigStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Persist the whole proxy record, active flags included.
    pub fn save_proxy_settings(&self, config: &ProxyConfig) -> Result<(), StoreError> {
        self.store.set_many(vec![
            (keys::HTTP_PORT, json!(config.http_port)),
            (keys::SOCKS5_PORT, json!(config.socks5_port)),
            (keys::HTTP_ENABLED, json!(config.http_enabled)),
            (keys::SOCKS5_ENABLED, json!(config.socks5_enabled)),
            (keys::HTTP_ACTIVE, json!(config.http_active)),
            (keys::SOCKS5_ACTIVE, json!(config.socks5_active)),
        ])
    }

    /// Load ports and enable flags. Active flags always come back false:
    /// only [`PreferenceStore::load_resume_flags`] reads the persisted ones.
    pub fn load_proxy_settings(&self) -> Result<ProxyConfig, StoreError> {
        Ok(ProxyConfig {
            http_port: self.port(keys::HTTP_PORT, DEFAULT_HTTP_PORT)?,
            socks5_port: self.port(keys::SOCKS5_PORT, DEFAULT_SOCKS5_PORT)?,
            http_enabled: self.bool(keys::HTTP_ENABLED, true)?,
            socks5_enabled: self.bool(keys::SOCKS5_ENABLED, true)?,
            http_active: false,
            socks5_active: false,
        })
    }

    pub fn load_resume_flags(&self) -> Result<ResumeFlags, StoreError> {
        Ok(ResumeFlags {
            http: self.bool(keys::HTTP_ACTIVE, false)?,
            socks5: self.bool(keys::SOCKS5_ACTIVE, false)?,
        })
    }

    pub fn save_selected_ip(&self, ip: &str) -> Result<(), StoreError> {
        self.store.set(keys::SELECTED_IP, json!(ip))
    }

    pub fn selected_ip(&self) -> Result<String, StoreError> {
        match self.store.get(keys::SELECTED_IP)? {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(ip)) => Ok(ip),
            Some(_) => Err(invalid(keys::SELECTED_IP, "a string")),
        }
    }

    pub fn clear_selected_ip(&self) -> Result<(), StoreError> {
        self.store.remove(keys::SELECTED_IP)
    }

    fn bool(&self, key: &str, default: bool) -> Result<bool, StoreError> {
        match self.store.get(key)? {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(value)) => Ok(value),
            Some(_) => Err(invalid(key, "a boolean")),
        }
    }

    fn port(&self, key: &str, default: u16) -> Result<u16, StoreError> {
        match self.store.get(key)? {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value
                .as_u64()
                .and_then(|port| u16::try_from(port).ok())
                .ok_or_else(|| invalid(key, "a port number")),
        }
    }
}

fn invalid(key: &str, expected: &'static str) -> StoreError {
    StoreError::InvalidValue {
        key: key.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn prefs() -> (Arc<MemoryStore>, PreferenceStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), PreferenceStore::new(store))
    }

    #[test]
    fn test_empty_store_yields_defaults() {
        let (_, prefs) = prefs();

        assert_eq!(prefs.load_proxy_settings().unwrap(), ProxyConfig::default());
        assert_eq!(prefs.load_resume_flags().unwrap(), ResumeFlags::default());
        assert_eq!(prefs.selected_ip().unwrap(), "");
    }

    #[test]
    fn test_settings_round_trip_resets_active_flags() {
        let (_, prefs) = prefs();
        let saved = ProxyConfig {
            http_port: 3128,
            socks5_port: 9050,
            http_enabled: false,
            socks5_enabled: true,
            http_active: false,
            socks5_active: true,
        };
        prefs.save_proxy_settings(&saved).unwrap();

        let loaded = prefs.load_proxy_settings().unwrap();
        assert_eq!(loaded.http_port, 3128);
        assert_eq!(loaded.socks5_port, 9050);
        assert!(!loaded.http_enabled);
        assert!(loaded.socks5_enabled);
        assert!(!loaded.http_active && !loaded.socks5_active);

        let resume = prefs.load_resume_flags().unwrap();
        assert_eq!(resume, ResumeFlags { http: false, socks5: true });
    }

    #[test]
    fn test_selected_ip_round_trip_and_clear() {
        let (_, prefs) = prefs();

        prefs.save_selected_ip("192.168.1.9").unwrap();
        assert_eq!(prefs.selected_ip().unwrap(), "192.168.1.9");

        prefs.clear_selected_ip().unwrap();
        assert_eq!(prefs.selected_ip().unwrap(), "");
    }

    #[test]
    fn test_out_of_range_port_is_rejected() {
        let (store, prefs) = prefs();
        store.set(keys::HTTP_PORT, json!(70000)).unwrap();

        assert!(matches!(
            prefs.load_proxy_settings(),
            Err(StoreError::InvalidValue { .. })
        ));
    }
}
