//! Settings entry: validation of user-supplied proxy settings

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::proxy::{Protocol, ProxyConfig};

/// Ports a user may choose; privileged ports are refused
pub const PORT_RANGE: RangeInclusive<u16> = 1024..=65535;

/// The proxy settings form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    pub http_port: u16,
    pub socks5_port: u16,
    pub http_enabled: bool,
    pub socks5_enabled: bool,
}

impl ProxySettings {
    /// Parse the raw text fields of the settings form. Only digits are
    /// accepted for ports.
    pub fn from_form(
        http_port: &str,
        socks5_port: &str,
        http_enabled: bool,
        socks5_enabled: bool,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            http_port: parse_port(Protocol::Http, http_port)?,
            socks5_port: parse_port(Protocol::Socks5, socks5_port)?,
            http_enabled,
            socks5_enabled,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_port(Protocol::Http, self.http_port)?;
        validate_port(Protocol::Socks5, self.socks5_port)?;
        Ok(())
    }
}

impl From<&ProxyConfig> for ProxySettings {
    fn from(config: &ProxyConfig) -> Self {
        Self {
            http_port: config.http_port,
            socks5_port: config.socks5_port,
            http_enabled: config.http_enabled,
            socks5_enabled: config.socks5_enabled,
        }
    }
}

/// Result of a settings change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsOutcome {
    /// A running proxy keeps its old port until it is restarted
    pub restart_required: bool,
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid {protocol} port: {port} (must be between 1024 and 65535)")]
    InvalidPort { protocol: &'static str, port: u32 },

    #[error("Invalid {protocol} port: '{input}' is not a number")]
    NotANumber { protocol: &'static str, input: String },

    #[error("Failed to save settings: {0}")]
    Save(String),
}

pub fn validate_port(protocol: Protocol, port: u16) -> Result<(), SettingsError> {
    if PORT_RANGE.contains(&port) {
        Ok(())
    } else {
        Err(SettingsError::InvalidPort {
            protocol: protocol.label(),
            port: port.into(),
        })
    }
}

fn parse_port(protocol: Protocol, input: &str) -> Result<u16, SettingsError> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(SettingsError::NotANumber {
            protocol: protocol.label(),
            input: input.to_string(),
        });
    }

    // Digits only, so a parse failure means the value overflowed u32
    let port: u32 = input.parse().unwrap_or(u32::MAX);
    u16::try_from(port).map_err(|_| SettingsError::InvalidPort {
        protocol: protocol.label(),
        port,
    })
}
