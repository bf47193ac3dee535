//! Settings-related Tauri commands

use std::sync::Arc;
use tauri::State;

use crate::proxy::Protocol;
use crate::settings::{validate_port, ProxySettings, SettingsOutcome};
use crate::state::AppState;

/// Get current settings
#[tauri::command]
pub async fn get_settings(state: State<'_, Arc<AppState>>) -> Result<ProxySettings, String> {
    let config = state.controller.config().await;
    Ok(ProxySettings::from(&config))
}

/// Save the whole settings form
#[tauri::command]
pub async fn save_settings(
    state: State<'_, Arc<AppState>>,
    settings: ProxySettings,
) -> Result<SettingsOutcome, String> {
    state
        .controller
        .apply_settings(settings)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_http_port(
    state: State<'_, Arc<AppState>>,
    port: u16,
) -> Result<SettingsOutcome, String> {
    validate_port(Protocol::Http, port).map_err(|e| e.to_string())?;
    Ok(state.controller.update_http_port(port).await)
}

#[tauri::command]
pub async fn update_socks5_port(
    state: State<'_, Arc<AppState>>,
    port: u16,
) -> Result<SettingsOutcome, String> {
    validate_port(Protocol::Socks5, port).map_err(|e| e.to_string())?;
    Ok(state.controller.update_socks5_port(port).await)
}

/// Enable or disable one protocol (`"http"` or `"socks5"`)
#[tauri::command]
pub async fn set_protocol_enabled(
    state: State<'_, Arc<AppState>>,
    protocol: String,
    enabled: bool,
) -> Result<(), String> {
    let protocol: Protocol = protocol.parse()?;
    state.controller.set_enabled(protocol, enabled).await;
    Ok(())
}

#[tauri::command]
pub async fn select_ip_address(state: State<'_, Arc<AppState>>, ip: String) -> Result<(), String> {
    state.controller.select_ip_address(&ip).await;
    Ok(())
}
