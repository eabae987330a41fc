//! State publisher — formats and emits every outbound bus message.

use mqtt_velux_domain::error::BusError;
use mqtt_velux_domain::node::{Limitation, Node};
use mqtt_velux_domain::position::BusPercent;
use mqtt_velux_domain::topic::{StateAttribute, build_state_topic, echo_topic, system_topic};

use crate::ports::BusPublisher;

/// Publishes node state under the response prefix, honouring one retain flag.
#[derive(Debug, Clone)]
pub struct StatePublisher<P> {
    bus: P,
    response_prefix: String,
    retain: bool,
}

impl<P: BusPublisher> StatePublisher<P> {
    pub fn new(bus: P, response_prefix: impl Into<String>, retain: bool) -> Self {
        Self {
            bus,
            response_prefix: response_prefix.into(),
            retain,
        }
    }

    /// Publish `position` (bus convention) and `closed` for `node`.
    ///
    /// Returns `Ok(false)` without publishing when the position is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the bus rejects either message.
    pub fn publish_position(&self, node: &Node) -> Result<bool, BusError> {
        let Some(percent) = node.position.percent() else {
            tracing::info!(node = %node.name, "device position unknown");
            return Ok(false);
        };
        tracing::info!(node = %node.name, percent = percent.value(), "device updated");

        let bus_percent = BusPercent::from(percent);
        let closed = if percent.is_closed() { "True" } else { "False" };
        self.publish_attribute(node, StateAttribute::Position, bus_percent.to_string())?;
        self.publish_attribute(node, StateAttribute::Closed, closed.to_string())?;
        Ok(true)
    }

    /// Publish the limitation minimum as the node's `rain` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the bus rejects the message.
    pub fn publish_limitation(&self, node: &Node, limitation: Limitation) -> Result<(), BusError> {
        tracing::debug!(
            node = %node.name,
            min = limitation.min_value,
            max = limitation.max_value,
            "limitation"
        );
        self.publish_attribute(node, StateAttribute::Rain, limitation.min_value.to_string())
    }

    /// Publish a lifecycle announcement on `mqtt-velux/system/message`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the bus rejects the message.
    pub fn publish_system_message(&self, text: &str) -> Result<(), BusError> {
        self.send(system_topic(&self.response_prefix, "message"), text.to_string())
    }

    /// Publish a diagnostic line on `mqtt-velux/system/<level>`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the bus rejects the message.
    pub fn publish_diagnostic(&self, level: &str, text: &str) -> Result<(), BusError> {
        self.send(
            system_topic(&self.response_prefix, &level.to_ascii_lowercase()),
            text.to_string(),
        )
    }

    /// Echo `payload` verbatim on `response/echo`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the bus rejects the message.
    pub fn publish_echo(&self, payload: &str) -> Result<(), BusError> {
        self.send(echo_topic(&self.response_prefix), payload.to_string())
    }

    fn publish_attribute(
        &self,
        node: &Node,
        attribute: StateAttribute,
        payload: String,
    ) -> Result<(), BusError> {
        let topic = build_state_topic(&self.response_prefix, &node.name, attribute.as_str());
        self.send(topic, payload)
    }

    fn send(&self, topic: String, payload: String) -> Result<(), BusError> {
        self.bus.publish(topic, payload, self.retain)
    }
}
