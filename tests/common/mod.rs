//! Shared fakes for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tether_proxy_lib::network::{FactsError, NetworkFacts};
use tether_proxy_lib::runtime::{ProxyRuntime, RuntimeError};
use tether_proxy_lib::store::{ConfigStore, MemoryStore, PreferenceStore, StoreError};
use tether_proxy_lib::{ProxyController, UiState, UiStateStore};

/// Runtime that records every command
#[derive(Default)]
pub struct RecordingRuntime {
    calls: Mutex<Vec<&'static str>>,
    fail: AtomicBool,
}

impl RecordingRuntime {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: &'static str) -> Result<(), RuntimeError> {
        self.calls.lock().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RuntimeError::Rejected("engine unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProxyRuntime for RecordingRuntime {
    async fn start(&self) -> Result<(), RuntimeError> {
        self.record("start")
    }

    async fn stop(&self) -> Result<(), RuntimeError> {
        self.record("stop")
    }
}

/// Memory store whose writes can be switched off
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn set_failing(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("disk full".into()));
        }
        Ok(())
    }
}

impl ConfigStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.remove(key)
    }
}

/// Facts provider returning whatever the test sets
#[derive(Default)]
pub struct StaticFacts {
    pub vpn: AtomicBool,
    pub hotspot: AtomicBool,
    pub ips: Mutex<Vec<String>>,
}

impl StaticFacts {
    pub fn with_ips(ips: &[&str]) -> Self {
        let facts = Self::default();
        *facts.ips.lock() = ips.iter().map(|ip| ip.to_string()).collect();
        facts
    }
}

#[async_trait::async_trait]
impl NetworkFacts for StaticFacts {
    async fn is_vpn_connected(&self) -> Result<bool, FactsError> {
        Ok(self.vpn.load(Ordering::SeqCst))
    }

    async fn is_hotspot_enabled(&self) -> Result<bool, FactsError> {
        Ok(self.hotspot.load(Ordering::SeqCst))
    }

    async fn available_ips(&self) -> Result<Vec<String>, FactsError> {
        Ok(self.ips.lock().clone())
    }
}

/// Controller wired to a shared store and a recording runtime
pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub runtime: Arc<RecordingRuntime>,
    pub ui: UiStateStore,
    pub controller: ProxyController,
}

impl Harness {
    pub fn new() -> Self {
        Self::on_store(Arc::new(FlakyStore::default()))
    }

    /// A fresh controller over an existing store, as after an app restart
    pub fn on_store(store: Arc<FlakyStore>) -> Self {
        let runtime = Arc::new(RecordingRuntime::default());
        let ui = UiStateStore::new(UiState::default());
        let controller = ProxyController::new(
            PreferenceStore::new(store.clone()),
            runtime.clone(),
            ui.clone(),
        );
        Self {
            store,
            runtime,
            ui,
            controller,
        }
    }

    pub fn prefs(&self) -> PreferenceStore {
        PreferenceStore::new(self.store.clone())
    }

    pub fn persisted(&self, key: &str) -> Option<Value> {
        self.store.get(key).unwrap()
    }
}
