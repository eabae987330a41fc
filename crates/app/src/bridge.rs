//! Bridge task — the single cooperative context that owns the gateway.
//!
//! Commands, change notifications, and the polling cadence are all served
//! here one at a time (see [`polling`](crate::polling)); bring-up and
//! tear-down live in [`lifecycle`](crate::lifecycle).

use std::time::Duration;

use tokio::sync::mpsc;

use mqtt_velux_domain::command::Command;
use mqtt_velux_domain::error::GatewayError;

use crate::directory::DirectoryPublisher;
use crate::listener::DeviceUpdateListener;
use crate::polling::PollState;
use crate::ports::{BusPublisher, DeviceGateway, UpdateReceiver, UpdateSender};
use crate::publisher::StatePublisher;
use crate::scheduler::CommandQueue;

/// Default delay between two polling iterations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Owns the gateway and every piece of state derived from it.
pub struct Bridge<G, P> {
    pub(crate) gateway: G,
    pub(crate) publisher: StatePublisher<P>,
    pub(crate) listener: DeviceUpdateListener<P>,
    pub(crate) commands: CommandQueue,
    pub(crate) directory: DirectoryPublisher,
    pub(crate) updates_tx: UpdateSender,
    pub(crate) updates_rx: UpdateReceiver,
    pub(crate) nodes: Vec<String>,
    pub(crate) poll_interval: Duration,
    pub(crate) poll_state: PollState,
}

impl<G, P> Bridge<G, P>
where
    G: DeviceGateway,
    P: BusPublisher + Clone,
{
    /// Create a bridge around `gateway`.
    ///
    /// `commands` is the draining half of the scheduler the router submits
    /// to; `directory` receives the node names once they are enumerated.
    pub fn new(
        gateway: G,
        publisher: StatePublisher<P>,
        commands: CommandQueue,
        directory: DirectoryPublisher,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            listener: DeviceUpdateListener::new(publisher.clone()),
            publisher,
            commands,
            directory,
            updates_tx,
            updates_rx,
            nodes: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_state: PollState::default(),
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    #[must_use]
    pub fn poll_state(&self) -> PollState {
        self.poll_state
    }

    /// Names enumerated at startup, in gateway order.
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Run one submitted command against the gateway.
    ///
    /// Gateway failures are logged; the bridge keeps serving.
    pub async fn execute(&mut self, command: Command) {
        tracing::info!(%command, "executing command");
        if let Err(err) = self
            .gateway
            .set_position(&command.node, command.target, false)
            .await
        {
            tracing::warn!(%err, detail = ?err, node = %command.node, "set position failed");
        }
    }

    /// Register the update listener on `name`; idempotent.
    pub(crate) fn register_listener(&mut self, name: &str) -> Result<(), GatewayError> {
        self.gateway
            .register_device_updated(name, self.updates_tx.clone())
    }
}
