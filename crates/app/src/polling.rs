//! Polling loop — the bridge task's main loop.
//!
//! Every `poll_interval` the loop walks all known nodes: re-registers the
//! update listener, queries the limitation, publishes `rain`, and publishes
//! a fresh state snapshot. Between iterations it also serves submitted
//! commands and change notifications. The run state is only checked
//! between units of work, so an in-flight iteration always completes.

use tokio::time::MissedTickBehavior;

use crate::bridge::Bridge;
use crate::lifecycle::RunState;
use crate::ports::{BusPublisher, DeviceGateway};

/// Polling loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    /// Serving; entered once startup completed.
    Running,
    /// Left after the run state stopped. Terminal.
    #[default]
    Stopped,
}

impl<G, P> Bridge<G, P>
where
    G: DeviceGateway,
    P: BusPublisher + Clone,
{
    /// Walk every known node once.
    ///
    /// A gateway failure on one node is logged and the walk moves on to the
    /// next node; the next iteration is the retry.
    pub async fn poll_once(&mut self) {
        let names = self.nodes.clone();
        for name in &names {
            if let Err(err) = self.register_listener(name) {
                tracing::warn!(%err, node = %name, "failed to register update listener");
            }

            let limitation = match self.gateway.get_limitation(name).await {
                Ok(limitation) => limitation,
                Err(err) => {
                    tracing::warn!(%err, detail = ?err, node = %name, "limitation query failed");
                    continue;
                }
            };

            let Some(node) = self.gateway.node(name) else {
                tracing::warn!(node = %name, "node vanished from gateway");
                continue;
            };
            tracing::info!(%node, "polled");

            if let Err(err) = self.publisher.publish_limitation(&node, limitation) {
                tracing::warn!(%err, node = %name, "failed to publish limitation");
            }
            self.listener.on_device_updated(&node);
        }
    }

    /// Serve commands, notifications, and polling until `run_state` stops.
    pub async fn serve(&mut self, run_state: &RunState) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.poll_state = PollState::Running;
        tracing::debug!(interval = ?self.poll_interval, "polling loop running");

        loop {
            tokio::select! {
                biased;
                () = run_state.stopped() => break,
                Some(command) = self.commands.recv() => self.execute(command).await,
                Some(node) = self.updates_rx.recv() => self.listener.on_device_updated(&node),
                _ = ticker.tick() => self.poll_once().await,
            }
        }

        self.poll_state = PollState::Stopped;
        tracing::debug!("polling loop stopped");
    }
}
