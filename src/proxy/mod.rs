//! Proxy protocols and the canonical persisted configuration

use serde::{Deserialize, Serialize};

/// Default HTTP proxy port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default SOCKS5 proxy port
pub const DEFAULT_SOCKS5_PORT: u16 = 1080;

/// Proxy protocol served by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Socks5,
}

impl Protocol {
    pub fn all() -> [Protocol; 2] {
        [Protocol::Http, Protocol::Socks5]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Socks5 => "socks5",
        }
    }

    /// Human-readable name used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Socks5 => "SOCKS5",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "socks5" | "socks" => Ok(Protocol::Socks5),
            _ => Err(format!("Unknown protocol: {}", s)),
        }
    }
}

/// Lifecycle state of a single protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolState {
    Disabled,
    EnabledInactive,
    EnabledActive,
}

/// Canonical proxy configuration, mirrored in the config store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub http_port: u16,
    pub socks5_port: u16,

    /// User intent: protocol may be started
    pub http_enabled: bool,
    pub socks5_enabled: bool,

    /// Last commanded runtime state
    pub http_active: bool,
    pub socks5_active: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            socks5_port: DEFAULT_SOCKS5_PORT,
            http_enabled: true,
            socks5_enabled: true,
            http_active: false,
            socks5_active: false,
        }
    }
}

impl ProxyConfig {
    pub fn port(&self, protocol: Protocol) -> u16 {
        match protocol {
            Protocol::Http => self.http_port,
            Protocol::Socks5 => self.socks5_port,
        }
    }

    pub fn set_port(&mut self, protocol: Protocol, port: u16) {
        match protocol {
            Protocol::Http => self.http_port = port,
            Protocol::Socks5 => self.socks5_port = port,
        }
    }

    pub fn is_enabled(&self, protocol: Protocol) -> bool {
        match protocol {
            Protocol::Http => self.http_enabled,
            Protocol::Socks5 => self.socks5_enabled,
        }
    }

    /// Disabling a protocol also clears its active flag.
    pub fn set_enabled(&mut self, protocol: Protocol, enabled: bool) {
        match protocol {
            Protocol::Http => self.http_enabled = enabled,
            Protocol::Socks5 => self.socks5_enabled = enabled,
        }
        if !enabled {
            self.set_active(protocol, false);
        }
    }

    pub fn is_active(&self, protocol: Protocol) -> bool {
        match protocol {
            Protocol::Http => self.http_active,
            Protocol::Socks5 => self.socks5_active,
        }
    }

    /// Activation is refused for a disabled protocol.
    pub fn set_active(&mut self, protocol: Protocol, active: bool) {
        let active = active && self.is_enabled(protocol);
        match protocol {
            Protocol::Http => self.http_active = active,
            Protocol::Socks5 => self.socks5_active = active,
        }
    }

    pub fn any_active(&self) -> bool {
        self.http_active || self.socks5_active
    }

    pub fn deactivate_all(&mut self) {
        self.http_active = false;
        self.socks5_active = false;
    }

    pub fn state(&self, protocol: Protocol) -> ProtocolState {
        if !self.is_enabled(protocol) {
            ProtocolState::Disabled
        } else if self.is_active(protocol) {
            ProtocolState::EnabledActive
        } else {
            ProtocolState::EnabledInactive
        }
    }
}
