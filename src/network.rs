//! Network facts: VPN, hotspot and candidate local addresses

use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};
use serde::{Deserialize, Serialize};

/// Point-in-time network facts provider
#[async_trait::async_trait]
pub trait NetworkFacts: Send + Sync {
    async fn is_vpn_connected(&self) -> Result<bool, FactsError>;
    async fn is_hotspot_enabled(&self) -> Result<bool, FactsError>;

    /// Ordered, distinct IPv4 addresses the proxy can be reached on
    async fn available_ips(&self) -> Result<Vec<String>, FactsError>;
}

/// One sample of all network facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub vpn_connected: bool,
    pub hotspot_enabled: bool,
    pub available_ips: Vec<String>,
}

impl NetworkSnapshot {
    /// Query every fact. Fails as a whole if any single query fails.
    pub async fn sample(facts: &dyn NetworkFacts) -> Result<Self, FactsError> {
        Ok(Self {
            vpn_connected: facts.is_vpn_connected().await?,
            hotspot_enabled: facts.is_hotspot_enabled().await?,
            available_ips: facts.available_ips().await?,
        })
    }
}

/// Transient failures while sampling network facts
#[derive(Debug, thiserror::Error)]
pub enum FactsError {
    #[error("Interface enumeration failed: {0}")]
    Interfaces(String),

    #[error("Network facts unavailable: {0}")]
    Unavailable(String),
}

/// Interface name prefixes used by VPN tunnels
const VPN_PREFIXES: &[&str] = &["tun", "tap", "wg", "ppp", "utun", "ipsec", "wintun", "tailscale"];

/// Interface name prefixes used by soft access points
const HOTSPOT_PREFIXES: &[&str] = &["ap", "softap", "swlan", "uap"];

/// Facts provider for desktop hosts, built on interface enumeration
#[derive(Debug, Default)]
pub struct SystemNetworkFacts;

impl SystemNetworkFacts {
    pub fn new() -> Self {
        Self
    }

    async fn interfaces(&self) -> Result<Vec<NetworkInterface>, FactsError> {
        tokio::task::spawn_blocking(NetworkInterface::show)
            .await
            .map_err(|e| FactsError::Interfaces(e.to_string()))?
            .map_err(|e| FactsError::Interfaces(e.to_string()))
    }
}

#[async_trait::async_trait]
impl NetworkFacts for SystemNetworkFacts {
    async fn is_vpn_connected(&self) -> Result<bool, FactsError> {
        Ok(self
            .interfaces()
            .await?
            .iter()
            .any(|iface| has_prefix(&iface.name, VPN_PREFIXES) && !iface.addr.is_empty()))
    }

    async fn is_hotspot_enabled(&self) -> Result<bool, FactsError> {
        Ok(self
            .interfaces()
            .await?
            .iter()
            .any(|iface| has_prefix(&iface.name, HOTSPOT_PREFIXES) && !iface.addr.is_empty()))
    }

    async fn available_ips(&self) -> Result<Vec<String>, FactsError> {
        let interfaces = self.interfaces().await?;
        let addresses = interfaces.iter().flat_map(|iface| iface.addr.iter()).filter_map(|addr| match addr {
            Addr::V4(v4) if !v4.ip.is_loopback() && !v4.ip.is_unspecified() => Some(v4.ip.to_string()),
            _ => None,
        });
        Ok(distinct(addresses))
    }
}

fn has_prefix(name: &str, prefixes: &[&str]) -> bool {
    let name = name.to_lowercase();
    prefixes.iter().any(|prefix| name.starts_with(prefix))
}

/// Drop repeated entries, keeping first-seen order
pub(crate) fn distinct(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
