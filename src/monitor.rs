//! Status monitor - periodically republishes network facts

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::network::{FactsError, NetworkFacts, NetworkSnapshot};
use crate::ui::UiStateStore;

/// Default period between two status samples
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(1000);

/// Keep the current selection while it is still offered, otherwise fall back
/// to the first candidate, or nothing.
pub fn next_selection(current: &str, candidates: &[String]) -> String {
    if !current.is_empty() && candidates.iter().any(|ip| ip == current) {
        current.to_string()
    } else {
        candidates.first().cloned().unwrap_or_default()
    }
}

/// Samples [`NetworkFacts`] and merges them into the UI snapshot.
///
/// Only writes `vpn_connected`, `hotspot_enabled`, `available_ips`, and
/// `selected_ip_address` when the current selection is no longer valid.
pub struct StatusMonitor {
    facts: Arc<dyn NetworkFacts>,
    ui: UiStateStore,
    interval: Duration,
}

impl StatusMonitor {
    pub fn new(facts: Arc<dyn NetworkFacts>, ui: UiStateStore) -> Self {
        Self {
            facts,
            ui,
            interval: DEFAULT_STATUS_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one sampling pass. On failure the snapshot is left untouched.
    pub async fn refresh(&self) -> Result<(), FactsError> {
        let sample = NetworkSnapshot::sample(self.facts.as_ref()).await?;

        let mut selected = String::new();
        self.ui.publish(|state| {
            state.vpn_connected = sample.vpn_connected;
            state.hotspot_enabled = sample.hotspot_enabled;
            state.selected_ip_address = next_selection(&state.selected_ip_address, &sample.available_ips);
            state.available_ips = sample.available_ips;
            selected = state.selected_ip_address.clone();
        });

        tracing::debug!(
            vpn = sample.vpn_connected,
            hotspot = sample.hotspot_enabled,
            selected = %selected,
            "Status update"
        );
        Ok(())
    }

    /// Run until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Status monitor started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        tracing::warn!(error = %e, "Error checking status");
                    }
                }
            }
        }

        tracing::info!("Status monitor stopped");
    }

    /// Spawn the loop on the current runtime
    pub fn spawn(self) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        MonitorHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Owner of a running [`StatusMonitor`]. Dropping it stops the loop.
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the loop and wait for it to finish
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Status monitor task ended abnormally");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
