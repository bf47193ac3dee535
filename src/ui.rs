//! Published UI snapshot

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::proxy::{DEFAULT_HTTP_PORT, DEFAULT_SOCKS5_PORT};

/// Everything the presentation layer reads.
///
/// Field ownership: the controller writes the proxy fields and
/// `error_message`; the status monitor writes the network fields and repairs
/// `selected_ip_address` when it no longer matches an available address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub http_active: bool,
    pub socks5_active: bool,
    pub http_port: u16,
    pub socks5_port: u16,
    pub vpn_connected: bool,
    pub hotspot_enabled: bool,
    pub available_ips: Vec<String>,
    pub selected_ip_address: String,
    pub error_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            http_active: false,
            socks5_active: false,
            http_port: DEFAULT_HTTP_PORT,
            socks5_port: DEFAULT_SOCKS5_PORT,
            vpn_connected: false,
            hotspot_enabled: false,
            available_ips: Vec::new(),
            selected_ip_address: String::new(),
            error_message: None,
        }
    }
}

/// Shared container for the current [`UiState`].
///
/// Readers take snapshots or subscribe. Writers go through
/// [`UiStateStore::publish`], which builds the next snapshot from the latest
/// one and swaps it in under the channel lock. Subscribers are only woken
/// when the snapshot actually changed.
#[derive(Clone)]
pub struct UiStateStore {
    tx: Arc<watch::Sender<UiState>>,
}

impl UiStateStore {
    pub fn new(initial: UiState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> UiState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.tx.subscribe()
    }

    pub(crate) fn publish<F>(&self, update: F)
    where
        F: FnOnce(&mut UiState),
    {
        self.tx.send_if_modified(|current| {
            let mut next = current.clone();
            update(&mut next);
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

impl Default for UiStateStore {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_published_snapshot() {
        let ui = UiStateStore::default();
        let mut rx = ui.subscribe();

        ui.publish(|state| {
            state.http_active = true;
            state.error_message = Some("boom".to_string());
        });

        rx.changed().await.expect("sender alive");
        let seen = rx.borrow_and_update().clone();
        assert!(seen.http_active);
        assert_eq!(seen.error_message.as_deref(), Some("boom"));
        assert_eq!(seen, ui.snapshot());
    }

    #[test]
    fn test_unchanged_publish_does_not_notify() {
        let ui = UiStateStore::default();
        let mut rx = ui.subscribe();

        ui.publish(|state| state.vpn_connected = false);
        assert!(!rx.has_changed().unwrap());

        ui.publish(|state| state.vpn_connected = true);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        ui.publish(|state| state.vpn_connected = true);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_publish_keeps_untouched_fields() {
        let ui = UiStateStore::default();
        ui.publish(|state| state.selected_ip_address = "10.0.0.2".to_string());
        ui.publish(|state| state.vpn_connected = true);

        let state = ui.snapshot();
        assert_eq!(state.selected_ip_address, "10.0.0.2");
        assert!(state.vpn_connected);
        assert_eq!(state.http_port, 8080);
    }
}
