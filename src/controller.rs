//! Proxy lifecycle controller
//!
//! Owns the canonical [`ProxyConfig`] and is the only writer of the proxy
//! fields of the UI snapshot. Every operation that reads and rewrites the
//! persisted record runs under one async mutex, so concurrent start/stop/port
//! changes never interleave their persist step. Within an operation the record
//! is persisted before the runtime is commanded.
//!
//! Operations never return runtime or store failures to the caller: they are
//! logged, surfaced as `error_message`, and the affected proxies fall back to
//! inactive.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::proxy::{Protocol, ProtocolState, ProxyConfig};
use crate::runtime::{ProxyRuntime, RuntimeError};
use crate::settings::{ProxySettings, SettingsError, SettingsOutcome};
use crate::store::{PreferenceStore, ResumeFlags, StoreError};
use crate::ui::UiStateStore;

/// Errors raised inside a lifecycle operation
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// What the runtime must be told after a config change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuntimeAction {
    None,
    Start,
    Stop,
    /// Stop, then start again so the engine drops a deactivated protocol
    Restart,
}

impl RuntimeAction {
    /// Action after raising active flags. A running engine only serves what
    /// was active when it launched, so adding a protocol restarts it.
    fn after_activation(previous: &ProxyConfig, newly_active: bool) -> Self {
        if newly_active && previous.any_active() {
            RuntimeAction::Restart
        } else {
            RuntimeAction::Start
        }
    }

    /// Action after one or more protocols were deactivated
    fn after_deactivation(next: &ProxyConfig) -> Self {
        if next.any_active() {
            RuntimeAction::Restart
        } else {
            RuntimeAction::Stop
        }
    }
}

/// Which protocols an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Http,
    Socks5,
    Both,
}

impl Target {
    fn includes(self, protocol: Protocol) -> bool {
        matches!(
            (self, protocol),
            (Target::Both, _) | (Target::Http, Protocol::Http) | (Target::Socks5, Protocol::Socks5)
        )
    }

    fn start_failure(self) -> &'static str {
        match self {
            Target::Http => "Failed to start HTTP proxy service",
            Target::Socks5 => "Failed to start SOCKS5 proxy service",
            Target::Both => "Failed to start proxy services",
        }
    }

    fn stop_failure(self) -> &'static str {
        match self {
            Target::Http => "Failed to stop HTTP proxy service",
            Target::Socks5 => "Failed to stop SOCKS5 proxy service",
            Target::Both => "Failed to stop proxy services",
        }
    }
}

/// Start/stop and settings surface for the HTTP and SOCKS5 proxies
pub struct ProxyController {
    config: Mutex<ProxyConfig>,
    prefs: PreferenceStore,
    runtime: Arc<dyn ProxyRuntime>,
    ui: UiStateStore,
}

impl ProxyController {
    pub fn new(prefs: PreferenceStore, runtime: Arc<dyn ProxyRuntime>, ui: UiStateStore) -> Self {
        Self {
            config: Mutex::new(ProxyConfig::default()),
            prefs,
            runtime,
            ui,
        }
    }

    /// Current canonical configuration
    pub async fn config(&self) -> ProxyConfig {
        self.config.lock().await.clone()
    }

    pub async fn protocol_state(&self, protocol: Protocol) -> ProtocolState {
        self.config.lock().await.state(protocol)
    }

    /// Restore settings and the selected address from the store, and resume
    /// the runtime if the previous run left a proxy active.
    pub async fn load_saved_config(&self) {
        let mut config = self.config.lock().await;

        let (mut next, resume, selected_ip) = match self.read_saved() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(error = %e, "Error loading saved proxy settings");
                self.ui.publish(|state| {
                    state.error_message = Some(format!("Failed to load saved proxy settings: {}", e));
                });
                return;
            }
        };

        next.set_active(Protocol::Http, resume.http);
        next.set_active(Protocol::Socks5, resume.socks5);

        tracing::debug!(
            http_port = next.http_port,
            socks5_port = next.socks5_port,
            http_active = next.http_active,
            socks5_active = next.socks5_active,
            ip = %selected_ip,
            "Loaded saved proxy settings"
        );

        let mut error = None;
        if next.any_active() {
            tracing::info!("Resuming proxy services from previous run");
            if let Err(e) = self.runtime.start().await {
                tracing::error!(error = %e, "Error resuming proxy services");
                self.fail_safe(&mut next);
                error = Some(format!("Failed to resume proxy services: {}", e));
            }
        } else if resume.any() {
            // Flags were left set for a protocol that is now disabled
            if let Err(e) = self.prefs.save_proxy_settings(&next) {
                tracing::warn!(error = %e, "Could not clear stale active flags");
            }
        }

        *config = next.clone();
        self.ui.publish(|state| {
            state.http_port = next.http_port;
            state.socks5_port = next.socks5_port;
            state.http_active = next.http_active;
            state.socks5_active = next.socks5_active;
            state.selected_ip_address = selected_ip;
            state.error_message = error;
        });
    }

    pub async fn start_http(&self) {
        self.start(Target::Http).await
    }

    pub async fn start_socks5(&self) {
        self.start(Target::Socks5).await
    }

    pub async fn start_both(&self) {
        self.start(Target::Both).await
    }

    pub async fn stop_http(&self) {
        self.stop(Target::Http).await
    }

    pub async fn stop_socks5(&self) {
        self.stop(Target::Socks5).await
    }

    pub async fn stop_both(&self) {
        self.stop(Target::Both).await
    }

    async fn start(&self, target: Target) {
        tracing::debug!(?target, "Start requested");
        let mut config = self.config.lock().await;

        let mut next = config.clone();
        let mut activated = false;
        let mut newly_active = false;
        for protocol in Protocol::all() {
            if target.includes(protocol) && config.is_enabled(protocol) {
                newly_active |= !config.is_active(protocol);
                next.set_active(protocol, true);
                activated = true;
            }
        }

        if !activated {
            tracing::info!(?target, "Requested proxy is disabled in settings, not starting");
            let message = match target {
                Target::Http => "HTTP proxy is disabled in settings",
                Target::Socks5 => "SOCKS5 proxy is disabled in settings",
                Target::Both => "Both proxies are disabled in settings",
            };
            self.ui.publish(|state| state.error_message = Some(message.to_string()));
            return;
        }

        match self.commit(&next, RuntimeAction::after_activation(&config, newly_active)).await {
            Ok(()) => {
                tracing::info!(
                    http = next.http_active,
                    socks5 = next.socks5_active,
                    "Proxy services started"
                );
                *config = next;
                self.publish_active(&config, None);
            }
            Err(e) => {
                tracing::error!(error = %e, ?target, "Error starting proxy services");
                self.fail_safe(&mut config);
                self.publish_active(&config, Some(format!("{}: {}", target.start_failure(), e)));
            }
        }
    }

    async fn stop(&self, target: Target) {
        tracing::debug!(?target, "Stop requested");
        let mut config = self.config.lock().await;

        let mut next = config.clone();
        let mut deactivated = false;
        for protocol in Protocol::all() {
            if target.includes(protocol) {
                deactivated |= config.is_active(protocol);
                next.set_active(protocol, false);
            }
        }

        let action = if deactivated {
            RuntimeAction::after_deactivation(&next)
        } else {
            RuntimeAction::None
        };

        match self.commit(&next, action).await {
            Ok(()) => {
                tracing::info!(
                    http = next.http_active,
                    socks5 = next.socks5_active,
                    "Proxy services stopped"
                );
                *config = next;
                self.publish_active(&config, None);
            }
            Err(e) => {
                tracing::error!(error = %e, ?target, "Error stopping proxy services");
                self.fail_safe(&mut config);
                self.publish_active(&config, Some(format!("{}: {}", target.stop_failure(), e)));
            }
        }
    }

    /// Enable or disable a protocol. Disabling an active protocol stops it.
    pub async fn set_enabled(&self, protocol: Protocol, enabled: bool) {
        let mut config = self.config.lock().await;

        let was_active = config.is_active(protocol);
        let mut next = config.clone();
        next.set_enabled(protocol, enabled);

        let action = if was_active && !enabled {
            RuntimeAction::after_deactivation(&next)
        } else {
            RuntimeAction::None
        };

        match self.commit(&next, action).await {
            Ok(()) => {
                tracing::info!(%protocol, enabled, "Protocol enablement changed");
                *config = next;
                self.publish_active(&config, None);
            }
            Err(e) => {
                tracing::error!(error = %e, %protocol, "Error updating protocol enablement");
                if action != RuntimeAction::None {
                    self.fail_safe(&mut config);
                }
                self.publish_active(&config, Some(format!("Failed to update {} proxy: {}", protocol.label(), e)));
            }
        }
    }

    pub async fn set_http_enabled(&self, enabled: bool) {
        self.set_enabled(Protocol::Http, enabled).await
    }

    pub async fn set_socks5_enabled(&self, enabled: bool) {
        self.set_enabled(Protocol::Socks5, enabled).await
    }

    pub async fn update_http_port(&self, port: u16) -> SettingsOutcome {
        self.update_port(Protocol::Http, port).await
    }

    pub async fn update_socks5_port(&self, port: u16) -> SettingsOutcome {
        self.update_port(Protocol::Socks5, port).await
    }

    /// Change a port without touching the runtime. A running proxy keeps its
    /// old port until restarted, which the outcome reports.
    pub async fn update_port(&self, protocol: Protocol, port: u16) -> SettingsOutcome {
        tracing::debug!(%protocol, port, "Port update requested");
        let mut config = self.config.lock().await;

        let restart_required = config.is_active(protocol) && config.port(protocol) != port;
        let mut next = config.clone();
        next.set_port(protocol, port);

        match self.commit(&next, RuntimeAction::None).await {
            Ok(()) => {
                *config = next;
                self.ui.publish(|state| {
                    match protocol {
                        Protocol::Http => state.http_port = port,
                        Protocol::Socks5 => state.socks5_port = port,
                    }
                    state.error_message = None;
                });
                if restart_required {
                    tracing::info!(%protocol, port, "Port changed while running, restart required");
                }
                SettingsOutcome { restart_required }
            }
            Err(e) => {
                tracing::error!(error = %e, %protocol, "Error saving port");
                self.ui.publish(|state| {
                    state.error_message = Some(format!("Failed to save {} port: {}", protocol.label(), e));
                });
                SettingsOutcome::default()
            }
        }
    }

    /// Apply the whole settings form. Ports are validated here, at the
    /// settings boundary. Disabling an active protocol stops it; port changes
    /// of running proxies only take effect after a restart.
    pub async fn apply_settings(&self, settings: ProxySettings) -> Result<SettingsOutcome, SettingsError> {
        settings.validate()?;
        let mut config = self.config.lock().await;

        let mut next = config.clone();
        let mut deactivated = false;
        let mut restart_required = false;
        for protocol in Protocol::all() {
            let (port, enabled) = match protocol {
                Protocol::Http => (settings.http_port, settings.http_enabled),
                Protocol::Socks5 => (settings.socks5_port, settings.socks5_enabled),
            };
            next.set_port(protocol, port);
            next.set_enabled(protocol, enabled);

            if config.is_active(protocol) {
                if enabled {
                    restart_required |= config.port(protocol) != port;
                } else {
                    deactivated = true;
                }
            }
        }

        let action = if deactivated {
            RuntimeAction::after_deactivation(&next)
        } else {
            RuntimeAction::None
        };

        match self.commit(&next, action).await {
            Ok(()) => {
                tracing::info!(?settings, restart_required, "Proxy settings saved");
                *config = next;
                let snapshot = config.clone();
                self.ui.publish(|state| {
                    state.http_port = snapshot.http_port;
                    state.socks5_port = snapshot.socks5_port;
                    state.http_active = snapshot.http_active;
                    state.socks5_active = snapshot.socks5_active;
                    state.error_message = None;
                });
                Ok(SettingsOutcome { restart_required })
            }
            Err(e) => {
                tracing::error!(error = %e, "Error saving proxy settings");
                if action != RuntimeAction::None {
                    self.fail_safe(&mut config);
                }
                let message = format!("Failed to save settings: {}", e);
                self.publish_active(&config, Some(message.clone()));
                Err(SettingsError::Save(message))
            }
        }
    }

    /// Select the address shown to the user. Not checked against the
    /// available addresses.
    pub async fn select_ip_address(&self, ip: &str) {
        tracing::debug!(ip, "IP address selected");
        let selected = ip.to_string();
        self.ui.publish(|state| state.selected_ip_address = selected);

        if let Err(e) = self.prefs.save_selected_ip(ip) {
            tracing::error!(error = %e, "Error saving selected IP address");
            self.ui.publish(|state| {
                state.error_message = Some(format!("Failed to save selected IP address: {}", e));
            });
        }
    }

    fn read_saved(&self) -> Result<(ProxyConfig, ResumeFlags, String), StoreError> {
        Ok((
            self.prefs.load_proxy_settings()?,
            self.prefs.load_resume_flags()?,
            self.prefs.selected_ip()?,
        ))
    }

    /// Persist `next`, then drive the runtime.
    async fn commit(&self, next: &ProxyConfig, action: RuntimeAction) -> Result<(), ControlError> {
        self.prefs.save_proxy_settings(next)?;

        match action {
            RuntimeAction::None => {}
            RuntimeAction::Start => self.runtime.start().await?,
            RuntimeAction::Stop => self.runtime.stop().await?,
            RuntimeAction::Restart => {
                self.runtime.stop().await?;
                self.runtime.start().await?;
            }
        }

        Ok(())
    }

    /// After a failed start/stop, consider every proxy inactive and try to
    /// record that.
    fn fail_safe(&self, config: &mut ProxyConfig) {
        config.deactivate_all();
        if let Err(e) = self.prefs.save_proxy_settings(config) {
            tracing::warn!(error = %e, "Could not persist inactive state after failure");
        }
    }

    fn publish_active(&self, config: &ProxyConfig, error: Option<String>) {
        let (http_active, socks5_active) = (config.http_active, config.socks5_active);
        self.ui.publish(|state| {
            state.http_active = http_active;
            state.socks5_active = socks5_active;
            state.error_message = error;
        });
    }
}
