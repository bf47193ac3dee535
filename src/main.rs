//! Tether Proxy - headless daemon entry point

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tether_proxy_lib::config::AppConfig;
use tether_proxy_lib::console::{self, ConsoleCommand};
use tether_proxy_lib::network::SystemNetworkFacts;
use tether_proxy_lib::runtime::ProcessRuntime;
use tether_proxy_lib::store::{JsonFileStore, PreferenceStore};
use tether_proxy_lib::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tether_proxy=debug,tether_proxy_lib=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tether Proxy v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    let store = Arc::new(JsonFileStore::open(config.store_path()?)?);
    let runtime = Arc::new(ProcessRuntime::new(
        config.engine.clone(),
        PreferenceStore::new(store.clone()),
    ));

    let state = AppState::new(
        store,
        runtime,
        Arc::new(SystemNetworkFacts::new()),
        config.status_interval(),
    );
    state.start().await;
    println!("{}", console::describe(&state));

    let mut snapshots = state.ui.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                tracing::debug!(?snapshot, "UI state changed");
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match ConsoleCommand::parse(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => println!("{}", command.execute(&state).await),
                    Err(e) => eprintln!("{}", e),
                }
            }
        }
    }

    state.shutdown().await;
    tracing::info!("Tether Proxy stopped");
    Ok(())
}
