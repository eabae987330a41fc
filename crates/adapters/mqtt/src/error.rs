//! MQTT adapter error types.

use mqtt_velux_domain::error::{BridgeError, BusError};

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The client refused a request, typically because its queue is full
    /// or the event loop is gone.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// The event loop lost its connection to the broker.
    #[error("MQTT connection error")]
    Connection(#[source] rumqttc::ConnectionError),

    /// The event loop did not drain within the shutdown grace period.
    #[error("MQTT event loop did not stop in time")]
    ShutdownTimeout,

    /// The event loop task panicked or was aborted.
    #[error("MQTT event loop task failed")]
    Task(#[source] tokio::task::JoinError),
}

impl From<MqttError> for BusError {
    fn from(err: MqttError) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl From<MqttError> for BridgeError {
    fn from(err: MqttError) -> Self {
        Self::Bus(err.into())
    }
}
