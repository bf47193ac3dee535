//! Application state management

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::controller::ProxyController;
use crate::monitor::{MonitorHandle, StatusMonitor};
use crate::network::NetworkFacts;
use crate::runtime::ProxyRuntime;
use crate::store::{ConfigStore, PreferenceStore};
use crate::ui::{UiState, UiStateStore};

/// Main application state
pub struct AppState {
    /// Lifecycle operations
    pub controller: Arc<ProxyController>,

    /// Published snapshot
    pub ui: UiStateStore,

    facts: Arc<dyn NetworkFacts>,
    status_interval: Duration,
    monitor: Mutex<Option<MonitorHandle>>,
    started: AtomicBool,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        runtime: Arc<dyn ProxyRuntime>,
        facts: Arc<dyn NetworkFacts>,
        status_interval: Duration,
    ) -> Self {
        let ui = UiStateStore::new(UiState::default());
        let controller = ProxyController::new(PreferenceStore::new(store), runtime, ui.clone());

        Self {
            controller: Arc::new(controller),
            ui,
            facts,
            status_interval,
            monitor: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }

    /// Restore saved settings, then start the status monitor.
    /// Later calls are no-ops until [`AppState::shutdown`].
    pub async fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Application state already started");
            return;
        }

        self.controller.load_saved_config().await;

        let handle = StatusMonitor::new(self.facts.clone(), self.ui.clone())
            .with_interval(self.status_interval)
            .spawn();
        *self.monitor.lock() = Some(handle);

        tracing::info!("Application state initialized");
    }

    /// Stop the status monitor. The proxy runtime is left as commanded.
    pub async fn shutdown(&self) {
        let handle = self.monitor.lock().take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
        self.started.store(false, Ordering::SeqCst);
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.lock().as_ref().is_some_and(MonitorHandle::is_running)
    }

    pub fn snapshot(&self) -> UiState {
        self.ui.snapshot()
    }
}
