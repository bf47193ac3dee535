//! Host configuration for the headless daemon

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::monitor::DEFAULT_STATUS_INTERVAL;
use crate::runtime::EngineCommand;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "TETHER_PROXY_CONFIG";

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Settings store file; defaults to `proxy_prefs.json` in the data dir
    pub store_path: Option<PathBuf>,

    /// Status monitor period in milliseconds
    pub status_interval_ms: u64,

    /// Proxy engine launched by the process runtime
    pub engine: EngineCommand,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            status_interval_ms: DEFAULT_STATUS_INTERVAL.as_millis() as u64,
            engine: EngineCommand::default(),
        }
    }
}

impl AppConfig {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)?;
            let config: AppConfig = serde_json::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, contents)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir().ok_or("Could not find config directory")?;
        Ok(config_dir.join("tether-proxy").join("config.json"))
    }

    pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let data_dir = dirs::data_dir().ok_or("Could not find data directory")?;
        Ok(data_dir.join("tether-proxy"))
    }

    pub fn store_path(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("proxy_prefs.json")),
        }
    }

    pub fn status_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_millis(self.status_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("tether-proxy-config-{}", uuid::Uuid::new_v4()))
            .join("config.json")
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let path = temp_config_path();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.status_interval(), Duration::from_millis(1000));
        assert_eq!(config.engine.program, None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_fields() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{ "status_interval_ms": 250, "engine": { "program": "/usr/bin/tether-engine" } }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.status_interval(), Duration::from_millis(250));
        assert_eq!(config.engine.program.as_deref(), Some("/usr/bin/tether-engine"));
        assert!(config.engine.args.is_empty());
        assert_eq!(config.store_path, None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = AppConfig {
            status_interval_ms: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.status_interval(), Duration::from_millis(1));
    }
}
