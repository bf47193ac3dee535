//! Proxy start/stop Tauri commands

use std::sync::Arc;
use tauri::State;

use crate::state::AppState;
use crate::ui::UiState;

/// Start the HTTP proxy
#[tauri::command]
pub async fn start_http(state: State<'_, Arc<AppState>>) -> Result<UiState, String> {
    state.controller.start_http().await;
    Ok(state.snapshot())
}

/// Start the SOCKS5 proxy
#[tauri::command]
pub async fn start_socks5(state: State<'_, Arc<AppState>>) -> Result<UiState, String> {
    state.controller.start_socks5().await;
    Ok(state.snapshot())
}

/// Start both proxies
#[tauri::command]
pub async fn start_both(state: State<'_, Arc<AppState>>) -> Result<UiState, String> {
    state.controller.start_both().await;
    Ok(state.snapshot())
}

#[tauri::command]
pub async fn stop_http(state: State<'_, Arc<AppState>>) -> Result<UiState, String> {
    state.controller.stop_http().await;
    Ok(state.snapshot())
}

#[tauri::command]
pub async fn stop_socks5(state: State<'_, Arc<AppState>>) -> Result<UiState, String> {
    state.controller.stop_socks5().await;
    Ok(state.snapshot())
}

#[tauri::command]
pub async fn stop_both(state: State<'_, Arc<AppState>>) -> Result<UiState, String> {
    state.controller.stop_both().await;
    Ok(state.snapshot())
}

/// Get the current UI snapshot
#[tauri::command]
pub async fn get_ui_state(state: State<'_, Arc<AppState>>) -> Result<UiState, String> {
    Ok(state.snapshot())
}
