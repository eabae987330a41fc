//! Bus port — outbound side of the pub/sub client.

use mqtt_velux_domain::error::BusError;

/// Publishes messages onto the bus.
///
/// Implementations must only enqueue: a publish never waits for the broker,
/// so it is safe to call from the bus client's own receive context.
pub trait BusPublisher: Send + Sync {
    /// Enqueue `payload` on `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] when the client can no longer accept messages.
    fn publish(&self, topic: String, payload: String, retain: bool) -> Result<(), BusError>;
}
