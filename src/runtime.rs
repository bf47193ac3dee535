//! Proxy runtime - the backgrounded engine that serves HTTP / SOCKS5

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::store::{PreferenceStore, StoreError};

/// Control surface of the proxy engine.
///
/// Both calls are idempotent and only enqueue the request. There is no
/// status query; callers track what they commanded.
#[async_trait::async_trait]
pub trait ProxyRuntime: Send + Sync {
    async fn start(&self) -> Result<(), RuntimeError>;
    async fn stop(&self) -> Result<(), RuntimeError>;
}

/// Runtime command errors
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Proxy engine is not configured")]
    NotConfigured,

    #[error("Failed to launch proxy engine: {0}")]
    Spawn(std::io::Error),

    #[error("Failed to stop proxy engine: {0}")]
    Kill(std::io::Error),

    #[error("Could not read proxy settings: {0}")]
    Settings(#[from] StoreError),

    #[error("Proxy engine rejected command: {0}")]
    Rejected(String),
}

/// How to launch the external proxy engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCommand {
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Runtime that runs the engine as a child process.
///
/// The engine learns what to serve from the environment: a port variable is
/// only exported for protocols whose persisted active flag is set.
pub struct ProcessRuntime {
    command: EngineCommand,
    prefs: PreferenceStore,
    child: Mutex<Option<Child>>,
}

impl ProcessRuntime {
    pub fn new(command: EngineCommand, prefs: PreferenceStore) -> Self {
        Self {
            command,
            prefs,
            child: Mutex::new(None),
        }
    }

    fn build_command(&self) -> Result<Command, RuntimeError> {
        let program = self
            .command
            .program
            .as_deref()
            .ok_or(RuntimeError::NotConfigured)?;

        let config = self.prefs.load_proxy_settings()?;
        let active = self.prefs.load_resume_flags()?;

        let mut command = Command::new(program);
        command
            .args(&self.command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if active.http {
            command.env("TETHER_HTTP_PORT", config.http_port.to_string());
        }
        if active.socks5 {
            command.env("TETHER_SOCKS5_PORT", config.socks5_port.to_string());
        }

        Ok(command)
    }
}

#[async_trait::async_trait]
impl ProxyRuntime for ProcessRuntime {
    async fn start(&self) -> Result<(), RuntimeError> {
        let mut child = self.child.lock().await;

        if let Some(running) = child.as_mut() {
            match running.try_wait() {
                Ok(None) => {
                    tracing::debug!("Proxy engine already running");
                    return Ok(());
                }
                Ok(Some(status)) => {
                    tracing::warn!(%status, "Proxy engine exited, relaunching");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not poll proxy engine, relaunching");
                }
            }
        }

        let spawned = self.build_command()?.spawn().map_err(RuntimeError::Spawn)?;
        tracing::info!(pid = ?spawned.id(), "Proxy engine launched");
        *child = Some(spawned);

        Ok(())
    }

    async fn stop(&self) -> Result<(), RuntimeError> {
        let Some(mut running) = self.child.lock().await.take() else {
            return Ok(());
        };

        if let Ok(Some(status)) = running.try_wait() {
            tracing::debug!(%status, "Proxy engine had already exited");
            return Ok(());
        }

        running.kill().await.map_err(RuntimeError::Kill)?;
        tracing::info!("Proxy engine stopped");
        Ok(())
    }
}
