//! Tether Proxy - control plane for the on-device HTTP and SOCKS5 proxy
//!
//! Decides when the proxy engine should run, keeps the user's ports and
//! enable flags in a durable store, and publishes one UI snapshot combining
//! proxy state with live network facts (VPN, hotspot, local addresses).
//!
//! The proxy engine, network detection and settings storage are injected as
//! [`runtime::ProxyRuntime`], [`network::NetworkFacts`] and
//! [`store::ConfigStore`].

pub mod config;
pub mod console;
pub mod controller;
pub mod monitor;
pub mod network;
pub mod proxy;
pub mod runtime;
pub mod settings;
pub mod state;
pub mod store;
pub mod ui;

#[cfg(feature = "tauri")]
pub mod commands;

pub use controller::{ControlError, ProxyController};
pub use monitor::{MonitorHandle, StatusMonitor};
pub use proxy::{Protocol, ProtocolState, ProxyConfig};
pub use state::AppState;
pub use ui::{UiState, UiStateStore};
