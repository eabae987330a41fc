//! `BusPublisher` backed by the rumqttc request queue.

use rumqttc::{AsyncClient, QoS};

use mqtt_velux_app::ports::BusPublisher;
use mqtt_velux_domain::error::BusError;

use crate::error::MqttError;

/// Publishes by enqueueing onto the client; the event loop does the I/O.
///
/// Never logs: diagnostics are forwarded through this publisher.
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl BusPublisher for MqttPublisher {
    fn publish(&self, topic: String, payload: String, retain: bool) -> Result<(), BusError> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, retain, payload)
            .map_err(|err| MqttError::Client(err).into())
    }
}
