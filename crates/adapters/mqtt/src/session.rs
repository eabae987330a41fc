//! Event loop task — connection upkeep and inbound routing.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, Packet, QoS};
use tokio::task::JoinHandle;

use mqtt_velux_app::lifecycle::RunState;
use mqtt_velux_app::ports::BusPublisher;
use mqtt_velux_app::router::CommandRouter;

use crate::config::MqttConfig;
use crate::error::MqttError;
use crate::publisher::MqttPublisher;

/// Pause before polling again after a connection error.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on draining the event loop at shutdown.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A configured but not yet running bus client.
pub struct MqttBus {
    client: AsyncClient,
    event_loop: EventLoop,
}

impl MqttBus {
    #[must_use]
    pub fn new(config: &MqttConfig) -> Self {
        let (client, event_loop) = AsyncClient::new(config.mqtt_options(), config.capacity);
        Self { client, event_loop }
    }

    /// Publisher handle; usable before [`start`](Self::start), messages
    /// queue up until the connection is established.
    #[must_use]
    pub fn publisher(&self) -> MqttPublisher {
        MqttPublisher::new(self.client.clone())
    }

    /// Spawn the event loop task.
    ///
    /// Inbound messages go to `router` while `run_state` is running and are
    /// dropped afterwards.
    pub fn start<P>(self, router: CommandRouter<P>, run_state: RunState) -> MqttSession
    where
        P: BusPublisher + 'static,
    {
        let task = tokio::spawn(drive(self.event_loop, self.client.clone(), router, run_state));
        MqttSession {
            client: self.client,
            task,
        }
    }
}

/// Handle on the running event loop task.
pub struct MqttSession {
    client: AsyncClient,
    task: JoinHandle<()>,
}

impl MqttSession {
    /// Send DISCONNECT after everything already queued and wait for the task.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::ShutdownTimeout`] when the task does not finish
    /// within [`SHUTDOWN_TIMEOUT`] (the task is aborted), and
    /// [`MqttError::Task`] if it panicked.
    pub async fn shutdown(self) -> Result<(), MqttError> {
        if let Err(err) = self.client.try_disconnect() {
            tracing::warn!(%err, "failed to queue disconnect");
        }

        let mut task = self.task;
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(MqttError::Task(err)),
            Err(_) => {
                task.abort();
                Err(MqttError::ShutdownTimeout)
            }
        }
    }
}

async fn drive<P: BusPublisher>(
    mut event_loop: EventLoop,
    client: AsyncClient,
    router: CommandRouter<P>,
    run_state: RunState,
) {
    let subscription = router.subscription();
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                tracing::warn!(code = ?ack.code, "connected to broker");
                tokio::spawn(subscribe(client.clone(), subscription.clone()));
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if run_state.is_running() {
                    router.handle(&publish.topic, &publish.payload);
                } else {
                    tracing::debug!(topic = %publish.topic, "stopping, message ignored");
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::info!("disconnected from broker");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                if !run_state.is_running() {
                    tracing::debug!(%err, "connection closed while stopping");
                    break;
                }
                let err = MqttError::Connection(err);
                tracing::warn!(%err, detail = ?err, "broker connection lost, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Queue the subscription, waiting for room behind pending publishes.
///
/// Runs outside [`drive`], which is what drains the request queue.
async fn subscribe(client: AsyncClient, topic: String) {
    if let Err(err) = client.subscribe(topic.as_str(), QoS::AtMostOnce).await {
        tracing::error!(err = %MqttError::Client(err), %topic, "subscribe failed");
    }
}
