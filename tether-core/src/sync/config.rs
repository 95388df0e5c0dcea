//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Settings for the sync client. Every field has a default, so an empty
/// JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host[:port]` of the page that served the UI.
    pub host: String,
    /// Socket path on that host.
    pub path: String,
    /// Use `wss` instead of `ws`.
    pub secure: bool,
    /// Automatic retries before giving up.
    pub max_attempts: u32,
    /// Delay before each automatic retry.
    pub retry_delay_ms: u64,
    /// Event name of the request sent on every successful connect.
    pub status_request: String,
    /// UI store key holding the tri-state connection indicator.
    pub connection_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:5585".into(),
            path: "/socket".into(),
            secure: false,
            max_attempts: 5,
            retry_delay_ms: 1000,
            status_request: "get-status".into(),
            connection_key: "sock-conn".into(),
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at `host`.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// The socket URL, e.g. `ws://127.0.0.1:5585/socket`.
    pub fn endpoint(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}{}", self.host, self.path)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
