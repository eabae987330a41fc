//! # mqtt-velux-app
//!
//! Application layer — the bridge's coordination logic and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `DeviceGateway` — connect, enumerate, move, query limitation, notify
//!   - `BusPublisher` — non-blocking publish onto the message bus
//! - Route inbound bus messages into validated [`Command`]s
//!   ([`router::CommandRouter`])
//! - Hand commands from the bus client's context to the cooperative
//!   bridge task ([`scheduler`])
//! - Publish node state and derived attributes ([`publisher::StatePublisher`])
//! - Poll limitations and republish state ([`polling`])
//! - Bring the bridge up and down in order ([`lifecycle`])
//!
//! ## Concurrency model
//! All gateway access happens on a single task, the [`bridge::Bridge`].
//! The bus client's receive task only parses, validates, and submits through
//! the [`scheduler::CommandScheduler`]; it never touches the gateway.
//!
//! ## Dependency rule
//! Depends on `mqtt-velux-domain` only (plus `tokio` for channels and time).
//! Never imports adapter crates.
//!
//! [`Command`]: mqtt_velux_domain::command::Command

pub mod bridge;
pub mod directory;
pub mod lifecycle;
pub mod listener;
pub mod polling;
pub mod ports;
pub mod publisher;
pub mod router;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;
