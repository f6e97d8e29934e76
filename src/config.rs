//! Configuration module
//!
//! [`AppConfig`] mirrors the TOML file on disk
//! (`~/.config/charge-gateway/config.toml` by default); [`Config`] is the
//! slice of it the gateway core needs at runtime.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::support::errors::ConfigError;

/// Gateway runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Charge point WebSocket host address
    pub host: String,
    /// Charge point WebSocket port
    pub port: u16,
    /// Heartbeat interval in seconds, sent in BootNotification replies
    pub heartbeat_interval: u32,
    /// Validity window advertised in Authorize replies
    pub authorize_expiry_hours: i64,
}

impl Config {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            heartbeat_interval: 30,
            authorize_expiry_hours: 24,
        }
    }
}

impl From<&AppConfig> for Config {
    fn from(app: &AppConfig) -> Self {
        Self {
            host: app.server.ws_host.clone(),
            port: app.server.ws_port,
            heartbeat_interval: app.gateway.heartbeat_interval,
            authorize_expiry_hours: app.gateway.authorize_expiry_hours,
        }
    }
}

// ── File-backed configuration ──────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub gateway: GatewaySection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub ws_host: String,
    pub ws_port: u16,
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for connection tasks to drain on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            ws_host: "0.0.0.0".to_string(),
            ws_port: 9000,
            api_host: "0.0.0.0".to_string(),
            api_port: 3000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    pub heartbeat_interval: u32,
    pub authorize_expiry_hours: i64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            heartbeat_interval: 30,
            authorize_expiry_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive, e.g. `info` or `charge_gateway=debug`
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

/// `<config_dir>/charge-gateway/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("charge-gateway").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}
