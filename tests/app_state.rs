//! Application state: saved settings plus the status monitor

mod common;

use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{FlakyStore, RecordingRuntime, StaticFacts};
use tether_proxy_lib::console::ConsoleCommand;
use tether_proxy_lib::store::{keys, ConfigStore};
use tether_proxy_lib::AppState;

const INTERVAL: Duration = Duration::from_millis(100);

fn app(store: Arc<FlakyStore>, facts: Arc<StaticFacts>) -> (AppState, Arc<RecordingRuntime>) {
    let runtime = Arc::new(RecordingRuntime::default());
    let state = AppState::new(store, runtime.clone(), facts, INTERVAL);
    (state, runtime)
}

#[tokio::test(start_paused = true)]
async fn test_start_publishes_network_facts() {
    let facts = Arc::new(StaticFacts::with_ips(&["192.168.43.1", "10.8.0.2"]));
    facts.hotspot.store(true, Ordering::SeqCst);
    let (state, _runtime) = app(Arc::new(FlakyStore::default()), facts.clone());

    state.start().await;
    assert!(state.is_monitoring());
    tokio::time::sleep(INTERVAL / 2).await;

    let ui = state.snapshot();
    assert!(ui.hotspot_enabled);
    assert!(!ui.vpn_connected);
    assert_eq!(ui.available_ips, vec!["192.168.43.1", "10.8.0.2"]);
    assert_eq!(ui.selected_ip_address, "192.168.43.1");

    // Selected address disappears: fall back to the first one offered
    facts.vpn.store(true, Ordering::SeqCst);
    *facts.ips.lock() = vec!["10.8.0.2".to_string()];
    tokio::time::sleep(INTERVAL).await;

    let ui = state.snapshot();
    assert!(ui.vpn_connected);
    assert_eq!(ui.selected_ip_address, "10.8.0.2");

    state.shutdown().await;
    assert!(!state.is_monitoring());
}

#[tokio::test(start_paused = true)]
async fn test_saved_selection_is_kept_while_offered() {
    let store = Arc::new(FlakyStore::default());
    store.set(keys::SELECTED_IP, json!("10.8.0.2")).unwrap();
    let facts = Arc::new(StaticFacts::with_ips(&["192.168.43.1", "10.8.0.2"]));
    let (state, _runtime) = app(store, facts);

    state.start().await;
    tokio::time::sleep(INTERVAL * 3).await;

    assert_eq!(state.snapshot().selected_ip_address, "10.8.0.2");
    state.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_monitor_leaves_proxy_fields_alone() {
    let store = Arc::new(FlakyStore::default());
    store.set(keys::SOCKS5_ACTIVE, json!(true)).unwrap();
    store.set(keys::SOCKS5_PORT, json!(1099)).unwrap();
    let (state, runtime) = app(store, Arc::new(StaticFacts::with_ips(&["192.168.1.20"])));

    state.start().await;
    assert_eq!(runtime.calls(), vec!["start"]);
    tokio::time::sleep(INTERVAL * 5).await;

    let ui = state.snapshot();
    assert!(ui.socks5_active);
    assert!(!ui.http_active);
    assert_eq!(ui.socks5_port, 1099);
    assert_eq!(ui.selected_ip_address, "192.168.1.20");
    state.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_ignored() {
    let store = Arc::new(FlakyStore::default());
    store.set(keys::HTTP_ACTIVE, json!(true)).unwrap();
    let (state, runtime) = app(store, Arc::new(StaticFacts::default()));

    state.start().await;
    state.start().await;

    assert_eq!(runtime.calls(), vec!["start"]);
    state.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_console_commands_drive_controller() {
    let (state, runtime) = app(
        Arc::new(FlakyStore::default()),
        Arc::new(StaticFacts::with_ips(&["192.168.43.1"])),
    );
    state.start().await;

    let reply = ConsoleCommand::parse("start both").unwrap().execute(&state).await;
    assert!(reply.contains("http=on (:8080) socks5=on (:1080)"), "{}", reply);

    let reply = ConsoleCommand::parse("port socks5 1090").unwrap().execute(&state).await;
    assert!(reply.contains("restart"), "{}", reply);

    let reply = ConsoleCommand::parse("stop http").unwrap().execute(&state).await;
    assert!(reply.contains("http=off"), "{}", reply);
    assert!(reply.contains("socks5=on (:1090)"), "{}", reply);

    assert_eq!(runtime.calls(), vec!["start", "stop", "start"]);
    state.shutdown().await;
}
