//! Configuration loading and persistence.
//!
//! Reads `config.json` from the platform config directory, then applies
//! `SOCKET_CLIENT_*` environment overrides. Broker credentials are only ever
//! taken from the environment and are never written to disk.

// Rust guideline compliant 2026-02

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::adapter::socket::DEFAULT_SOCKET_URL;

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.json";

/// Broker endpoint used when none is configured.
pub const DEFAULT_BROKER_URL: &str = "ws://localhost:61614/stomp";

/// STOMP broker settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct BrokerConfig {
    /// WebSocket URL of the broker.
    pub broker_url: String,
    /// Heart-beat we want from the broker, in ms; 0 disables.
    pub heartbeat_incoming_ms: u64,
    /// Heart-beat we offer to send, in ms; 0 disables.
    pub heartbeat_outgoing_ms: u64,
    /// Delay between reconnection attempts, in ms; 0 disables reconnection.
    pub reconnect_delay_ms: u64,
    /// `device-type` connect header.
    pub device_type: String,
    /// `app-version` connect header.
    pub app_version: String,
    /// `authorization` connect header - NOT serialized to disk.
    #[serde(skip)]
    pub auth_token: Option<String>,
    /// `device-key` connect header - NOT serialized to disk.
    #[serde(skip)]
    pub device_key: Option<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            broker_url: DEFAULT_BROKER_URL.to_string(),
            heartbeat_incoming_ms: 0,
            heartbeat_outgoing_ms: 0,
            reconnect_delay_ms: 5000,
            device_type: "WEB".to_string(),
            app_version: "1.0.0".to_string(),
            auth_token: None,
            device_key: None,
        }
    }
}

impl BrokerConfig {
    /// Settings for `broker_url` with everything else defaulted.
    pub fn new(broker_url: impl Into<String>) -> Self {
        Self {
            broker_url: broker_url.into(),
            ..Self::default()
        }
    }

    /// Headers added to the CONNECT frame. Absent secrets are left out.
    #[must_use]
    pub fn connect_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(4);
        if let Some(token) = &self.auth_token {
            headers.push(("authorization".to_string(), token.clone()));
        }
        headers.push(("device-type".to_string(), self.device_type.clone()));
        if let Some(key) = &self.device_key {
            headers.push(("device-key".to_string(), key.clone()));
        }
        headers.push(("app-version".to_string(), self.app_version.clone()));
        headers
    }
}

/// Configuration for the socket client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Endpoint for the raw socket adapter.
    pub socket_url: String,
    /// Settings for the pub/sub adapter.
    pub broker: BrokerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_url: DEFAULT_SOCKET_URL.to_string(),
            broker: BrokerConfig::default(),
        }
    }
}

impl Config {
    /// Returns the configuration directory path.
    ///
    /// `SOCKET_CLIENT_CONFIG_DIR` overrides the platform config directory.
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("SOCKET_CLIENT_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("socket-client"))
    }

    /// Loads configuration from file, with environment variable overrides.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn load() -> Result<Self> {
        let path = Self::config_dir()?.join(CONFIG_FILE);
        let mut config = Self::load_from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads `path`, falling back to defaults if it does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SOCKET_CLIENT_URL") {
            self.socket_url = url;
        }
        if let Some(url) = lookup("SOCKET_CLIENT_BROKER_URL") {
            self.broker.broker_url = url;
        }

        let number = |key: &str| {
            let raw = lookup(key)?;
            match raw.trim().parse::<u64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("Ignoring {}={:?}: not a number", key, raw);
                    None
                }
            }
        };
        if let Some(ms) = number("SOCKET_CLIENT_HEARTBEAT_INCOMING") {
            self.broker.heartbeat_incoming_ms = ms;
        }
        if let Some(ms) = number("SOCKET_CLIENT_HEARTBEAT_OUTGOING") {
            self.broker.heartbeat_outgoing_ms = ms;
        }
        if let Some(ms) = number("SOCKET_CLIENT_RECONNECT_DELAY") {
            self.broker.reconnect_delay_ms = ms;
        }

        if let Some(device_type) = lookup("SOCKET_CLIENT_DEVICE_TYPE") {
            self.broker.device_type = device_type;
        }

        // Secrets: environment only
        if let Some(token) = lookup("SOCKET_CLIENT_AUTH_TOKEN") {
            self.broker.auth_token = Some(token);
        }
        if let Some(key) = lookup("SOCKET_CLIENT_DEVICE_KEY") {
            self.broker.device_key = Some(key);
        }
    }

    /// Persists the configuration to `path`. Secrets are not written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        #[cfg(unix)]
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

        Ok(())
    }

    /// Persists the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir()?.join(CONFIG_FILE))
    }
}
