//! Tauri plugin exposing the controller to a webview UI
//!
//! The host app registers `tauri-plugin-store` and then this plugin:
//!
//! ```ignore
//! tauri::Builder::default()
//!     .plugin(tauri_plugin_store::Builder::new().build())
//!     .plugin(tether_proxy_lib::commands::plugin(runtime, facts))
//! ```
//!
//! Every snapshot change is emitted to the frontend as [`UI_STATE_EVENT`].

pub mod proxy;
pub mod settings;

use std::sync::Arc;
use tauri::plugin::{Builder, TauriPlugin};
use tauri::{Emitter, Manager, Runtime};

use crate::monitor::DEFAULT_STATUS_INTERVAL;
use crate::network::NetworkFacts;
use crate::runtime::ProxyRuntime;
use crate::state::AppState;
use crate::store::TauriStore;

/// Event carrying the full [`crate::ui::UiState`]
pub const UI_STATE_EVENT: &str = "ui-state";

pub fn plugin<R: Runtime>(
    runtime: Arc<dyn ProxyRuntime>,
    facts: Arc<dyn NetworkFacts>,
) -> TauriPlugin<R> {
    Builder::new("tether-proxy")
        .invoke_handler(tauri::generate_handler![
            // Proxy commands
            proxy::start_http,
            proxy::start_socks5,
            proxy::start_both,
            proxy::stop_http,
            proxy::stop_socks5,
            proxy::stop_both,
            proxy::get_ui_state,
            // Settings commands
            settings::get_settings,
            settings::save_settings,
            settings::update_http_port,
            settings::update_socks5_port,
            settings::set_protocol_enabled,
            settings::select_ip_address,
        ])
        .setup(move |app, _api| {
            let store = TauriStore::open(app)?;
            let state = Arc::new(AppState::new(
                Arc::new(store),
                runtime,
                facts,
                DEFAULT_STATUS_INTERVAL,
            ));
            app.manage(state.clone());

            let handle = app.clone();
            tauri::async_runtime::spawn(async move {
                let mut snapshots = state.ui.subscribe();
                state.start().await;

                loop {
                    let snapshot = snapshots.borrow_and_update().clone();
                    if let Err(e) = handle.emit(UI_STATE_EVENT, snapshot) {
                        tracing::warn!(error = %e, "Failed to emit UI state");
                    }
                    if snapshots.changed().await.is_err() {
                        break;
                    }
                }
            });

            tracing::info!("Tether proxy plugin initialized");
            Ok(())
        })
        .build()
}
