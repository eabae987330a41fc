//! # mqtt-velux-domain
//!
//! Pure domain model for the MQTT ↔ Velux bridge.
//!
//! ## Responsibilities
//! - Position vocabularies: human commands, bus percent, device percent, and
//!   the single inversion point between the last two
//! - Topic codec: inbound `prefix/<node>/<action>` parsing and outbound
//!   `response/<node-path>/<attribute>` building
//! - Nodes (actuators) as reported by the gateway, their kinds and limitations
//! - Commands issued to nodes
//! - The error taxonomy shared by every layer
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.

pub mod command;
pub mod error;
pub mod node;
pub mod position;
pub mod topic;
