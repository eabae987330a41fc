//! # mqtt-velux-adapter-mqtt
//!
//! MQTT adapter — the bridge's connection to the message bus.
//!
//! ## Responsibilities
//! - Build the client from [`config::MqttConfig`] (credentials only when both
//!   halves are configured)
//! - Implement the `BusPublisher` port as a non-blocking enqueue
//!   ([`publisher::MqttPublisher`])
//! - Drive the event loop in a background task: subscribe on every CONNACK,
//!   hand inbound messages to the command router, retry lost connections
//!   ([`session`])
//!
//! ## Dependency rule
//! Same as other adapters: depends on `mqtt-velux-app` and `mqtt-velux-domain`.

pub mod config;
pub mod error;
pub mod publisher;
pub mod session;

pub use config::MqttConfig;
pub use error::MqttError;
pub use publisher::MqttPublisher;
pub use session::{MqttBus, MqttSession};
