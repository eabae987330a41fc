//! Gateway port — the device-gateway client that owns the physical nodes.

use std::future::Future;

use tokio::sync::mpsc;

use mqtt_velux_domain::error::GatewayError;
use mqtt_velux_domain::node::{Limitation, Node};
use mqtt_velux_domain::position::DevicePercent;

/// Channel end a gateway pushes node snapshots into whenever a node changes.
pub type UpdateSender = mpsc::UnboundedSender<Node>;

/// Receiving end of [`UpdateSender`].
pub type UpdateReceiver = mpsc::UnboundedReceiver<Node>;

/// A connection to the hub that drives the actuators.
///
/// Every method is called from the single bridge task, one at a time.
pub trait DeviceGateway: Send {
    /// Establish the link to the hub.
    fn connect(&mut self) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Tear the link down. Outstanding calls get no grace period.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Enumerate the nodes known to the hub.
    fn load_nodes(&mut self) -> impl Future<Output = Result<Vec<Node>, GatewayError>> + Send;

    /// Latest snapshot of `name`, if the hub reported it.
    fn node(&self, name: &str) -> Option<Node>;

    /// Move `name` to `target`.
    ///
    /// With `wait_for_completion == false` the call returns once the hub
    /// accepted the request.
    fn set_position(
        &mut self,
        name: &str,
        target: DevicePercent,
        wait_for_completion: bool,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Query the limitation bounds of `name`.
    fn get_limitation(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Limitation, GatewayError>> + Send;

    /// Register `listener` for change notifications on `name`.
    ///
    /// Must be idempotent: registering a sender whose channel is already
    /// registered for `name` is a no-op, so one change yields one snapshot
    /// per channel.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NodeNotFound`] for an unknown node.
    fn register_device_updated(
        &mut self,
        name: &str,
        listener: UpdateSender,
    ) -> Result<(), GatewayError>;
}
