//! Configuration loading — TOML file with environment variable overrides.
//!
//! The file path is given on the command line. Every field has a default,
//! so a partial file is enough. Environment variables take precedence over
//! file values.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use mqtt_velux_adapter_mqtt::MqttConfig;
use mqtt_velux_adapter_virtual::VirtualNodeConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bus connection and topic layout.
    pub mqtt: MqttConfig,
    /// Polling cadence.
    pub polling: PollingConfig,
    /// Nodes served by the virtual gateway.
    pub gateway: GatewayConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between two polling iterations.
    pub interval_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub nodes: Vec<VirtualNodeConfig>,
}

/// Logging configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: Option<String>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl PollingConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Config {
    /// Load configuration from `path` then apply environment-variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or
    /// describes an unusable setup.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MQTT_VELUX_MQTT_HOST") {
            self.mqtt.host = val;
        }
        if let Some(port) = var("MQTT_VELUX_MQTT_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.port = port;
        }
        if let Some(val) = var("MQTT_VELUX_MQTT_USER") {
            self.mqtt.username = Some(val);
        }
        if let Some(val) = var("MQTT_VELUX_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| Err(ConfigError::Validation(reason.to_string()));
        let prefix = self.mqtt.prefix.as_str();
        let response = self.mqtt.response.as_str();

        if self.mqtt.port == 0 {
            return invalid("mqtt.port must be non-zero");
        }
        if self.mqtt.capacity == 0 {
            return invalid("mqtt.capacity must be non-zero");
        }
        if prefix.is_empty() || response.is_empty() {
            return invalid("mqtt.prefix and mqtt.response must be non-empty");
        }
        if response == prefix || response.starts_with(&format!("{prefix}/")) {
            return invalid("mqtt.response must not be inside mqtt.prefix");
        }
        if self.polling.interval_secs == 0 {
            return invalid("polling.interval_secs must be non-zero");
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
