//! Device update listener — turns gateway change notifications into
//! position/closed publishes.

use mqtt_velux_domain::node::Node;

use crate::ports::BusPublisher;
use crate::publisher::StatePublisher;

/// Reacts to node snapshots pushed by the gateway.
#[derive(Debug, Clone)]
pub struct DeviceUpdateListener<P> {
    publisher: StatePublisher<P>,
}

impl<P: BusPublisher> DeviceUpdateListener<P> {
    pub fn new(publisher: StatePublisher<P>) -> Self {
        Self { publisher }
    }

    /// Publish the state of `node` if it is an opening device.
    pub fn on_device_updated(&self, node: &Node) {
        if !node.kind.is_opening() {
            return;
        }
        if let Err(err) = self.publisher.publish_position(node) {
            tracing::warn!(%err, node = %node.name, "failed to publish device state");
        }
    }
}
