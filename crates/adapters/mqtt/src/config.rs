//! MQTT connection configuration.

use std::time::Duration;

use rumqttc::MqttOptions;
use serde::{Deserialize, Deserializer};

use mqtt_velux_domain::position::is_truthy;

/// Configuration for the bus connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Client identifier; a random one is generated when absent.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Inbound topic prefix; the bridge subscribes to `prefix/#`.
    pub prefix: String,
    /// Response prefix every outbound message is published under.
    pub response: String,
    /// Retain flag applied to every outbound message.
    #[serde(deserialize_with = "deserialize_flag")]
    pub retain: bool,
    /// Size of the client's outgoing request queue.
    pub capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: default_client_id(),
            keep_alive_secs: 60,
            username: None,
            password: None,
            prefix: "velux/set".to_string(),
            response: "velux/state".to_string(),
            retain: false,
            capacity: 64,
        }
    }
}

fn default_client_id() -> String {
    format!("mqtt-velux-{}", uuid::Uuid::new_v4())
}

impl MqttConfig {
    /// Username and password, only when both are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }

    /// Client options for rumqttc.
    #[must_use]
    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));
        if let Some((username, password)) = self.credentials() {
            options.set_credentials(username, password);
        }
        options
    }
}

/// Accepts a bool, or a string/number read as a truthy token.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => is_truthy(&value.to_string()),
        Flag::Text(value) => is_truthy(&value),
    })
}
