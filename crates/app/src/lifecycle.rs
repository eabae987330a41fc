//! Lifecycle — run state, bring-up, and tear-down of the bridge task.

use tokio_util::sync::CancellationToken;

use mqtt_velux_domain::error::BridgeError;

use crate::bridge::Bridge;
use crate::directory::DeviceDirectory;
use crate::ports::{BusPublisher, DeviceGateway};

/// Message published on the system topic once the bridge has stopped.
pub const ENDED_MESSAGE: &str = "ended.";

/// Shared running/stopping flag.
///
/// Starts running; flips to stopping at most once and never back.
#[derive(Debug, Clone, Default)]
pub struct RunState(CancellationToken);

impl RunState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.0.is_cancelled()
    }

    /// Flip to stopping. Returns `true` for the call that did the flip.
    pub fn request_stop(&self) -> bool {
        let first = self.is_running();
        self.0.cancel();
        first
    }

    /// Resolves once a stop has been requested.
    pub async fn stopped(&self) {
        self.0.cancelled().await;
    }
}

impl<G, P> Bridge<G, P>
where
    G: DeviceGateway,
    P: BusPublisher + Clone,
{
    /// Connect, enumerate, register listeners, and announce startup.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Startup`] naming the stage that failed.
    pub async fn start(&mut self) -> Result<(), BridgeError> {
        self.gateway
            .connect()
            .await
            .map_err(|err| BridgeError::startup("connecting gateway", err))?;

        let nodes = self
            .gateway
            .load_nodes()
            .await
            .map_err(|err| BridgeError::startup("enumerating nodes", err))?;

        for node in &nodes {
            self.register_listener(&node.name)
                .map_err(|err| BridgeError::startup("registering listeners", err))?;
            tracing::info!(%node, "node discovered");
        }

        self.nodes = nodes.into_iter().map(|node| node.name).collect();
        self.directory
            .send_replace(DeviceDirectory::new(self.nodes.iter().cloned()));

        let announcement = format!("started: {}", self.nodes.join(", "));
        tracing::info!("{announcement}");
        self.publisher
            .publish_system_message(&announcement)
            .map_err(|err| BridgeError::startup("announcing startup", err))?;
        Ok(())
    }

    /// Disconnect the gateway and announce the end of the run.
    ///
    /// Failures are logged; tear-down always runs to the end.
    pub async fn shutdown(&mut self) {
        if let Err(err) = self.gateway.disconnect().await {
            tracing::warn!(%err, detail = ?err, "gateway disconnect failed");
        }
        if let Err(err) = self.publisher.publish_system_message(ENDED_MESSAGE) {
            tracing::warn!(%err, "failed to announce shutdown");
        }
        tracing::info!("{ENDED_MESSAGE}");
    }

    /// Start, serve until `run_state` stops, then shut down.
    ///
    /// A startup failure flips `run_state` so the rest of the process winds
    /// down with it.
    ///
    /// # Errors
    ///
    /// Returns the startup error; a started bridge always ends with `Ok`.
    pub async fn run(mut self, run_state: RunState) -> Result<(), BridgeError> {
        if let Err(err) = self.start().await {
            tracing::error!(%err, detail = ?err, "startup failed");
            run_state.request_stop();
            return Err(err);
        }

        tracing::info!("looping...");
        self.serve(&run_state).await;
        tracing::info!("done.");

        self.shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::directory::{self, DirectoryReader};
    use crate::publisher::StatePublisher;
    use crate::scheduler;
    use crate::testing::{GatewayCall, RecordingBus, ScriptedGateway};

    fn bridge(
        gateway: ScriptedGateway,
        bus: &RecordingBus,
    ) -> (Bridge<ScriptedGateway, RecordingBus>, DirectoryReader) {
        let (_scheduler, queue) = scheduler::channel();
        let (directory, reader) = directory::channel();
        let bridge = Bridge::new(
            gateway,
            StatePublisher::new(bus.clone(), "resp", false),
            queue,
            directory,
        );
        (bridge, reader)
    }

    #[test]
    fn should_flip_run_state_once() {
        let run_state = RunState::new();
        assert!(run_state.is_running());

        assert!(run_state.request_stop());
        assert!(!run_state.request_stop());
        assert!(!run_state.clone().is_running());
    }

    #[tokio::test]
    async fn should_connect_enumerate_and_announce_in_order() {
        let bus = RecordingBus::default();
        let gateway = ScriptedGateway::default()
            .with_window("kitchen", Some(50), 0)
            .with_window("bath", None, 0);
        let calls = gateway.call_log();
        let (mut bridge, reader) = bridge(gateway, &bus);

        bridge.start().await.unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                GatewayCall::Connect,
                GatewayCall::LoadNodes,
                GatewayCall::Register("bath".to_string()),
                GatewayCall::Register("kitchen".to_string()),
            ]
        );
        assert_eq!(bridge.nodes(), ["bath".to_string(), "kitchen".to_string()]);
        assert!(reader.borrow().contains("kitchen"));
        assert_eq!(
            bus.messages(),
            vec![(
                "resp/mqtt-velux/system/message".to_string(),
                "started: bath, kitchen".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn should_announce_empty_node_list() {
        let bus = RecordingBus::default();
        let (mut bridge, _reader) = bridge(ScriptedGateway::default(), &bus);

        bridge.start().await.unwrap();

        assert_eq!(
            bus.payload_of("resp/mqtt-velux/system/message").as_deref(),
            Some("started: ")
        );
    }

    #[tokio::test]
    async fn should_abort_startup_when_gateway_is_unreachable() {
        let bus = RecordingBus::default();
        let mut gateway = ScriptedGateway::default();
        gateway.fail_connect = true;
        let calls = gateway.call_log();
        let (bridge, reader) = bridge(gateway, &bus);
        let run_state = RunState::new();

        let err = bridge.run(run_state.clone()).await.unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Startup {
                stage: "connecting gateway",
                ..
            }
        ));
        assert!(!run_state.is_running());
        assert!(reader.borrow().is_empty());
        assert!(bus.messages().is_empty());
        assert_eq!(*calls.lock().unwrap(), vec![GatewayCall::Connect]);
    }

    #[tokio::test]
    async fn should_fail_startup_when_announcement_cannot_be_published() {
        let bus = RecordingBus::default();
        bus.close();
        let (mut bridge, _reader) = bridge(ScriptedGateway::default(), &bus);

        let err = bridge.start().await.unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Startup {
                stage: "announcing startup",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn should_disconnect_then_announce_end() {
        let bus = RecordingBus::default();
        let gateway = ScriptedGateway::default().with_window("kitchen", Some(50), 0);
        let calls = gateway.call_log();
        let (mut bridge, _reader) = bridge(gateway, &bus);

        bridge.shutdown().await;

        assert_eq!(*calls.lock().unwrap(), vec![GatewayCall::Disconnect]);
        assert_eq!(
            bus.messages(),
            vec![(
                "resp/mqtt-velux/system/message".to_string(),
                "ended.".to_string()
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_until_stopped_and_end_cleanly() {
        let bus = RecordingBus::default();
        let gateway = ScriptedGateway::default().with_window("kitchen", Some(50), 2);
        let calls = gateway.call_log();
        let (bridge, _reader) = bridge(gateway, &bus);
        let run_state = RunState::new();

        let handle = tokio::spawn(bridge.run(run_state.clone()));
        tokio::time::sleep(Duration::from_secs(1)).await;
        run_state.request_stop();
        handle.await.unwrap().unwrap();

        assert_eq!(calls.lock().unwrap().last(), Some(&GatewayCall::Disconnect));
        assert_eq!(bus.payload_of("resp/kitchen/rain").as_deref(), Some("2"));
        assert_eq!(
            bus.payload_of("resp/mqtt-velux/system/message").as_deref(),
            Some("ended.")
        );
    }

    #[tokio::test]
    async fn should_skip_polling_when_stopped_before_serving() {
        let bus = RecordingBus::default();
        let gateway = ScriptedGateway::default().with_window("kitchen", Some(50), 2);
        let calls = gateway.call_log();
        let (bridge, _reader) = bridge(gateway, &bus);
        let run_state = RunState::new();
        run_state.request_stop();

        bridge.run(run_state).await.unwrap();

        assert!(
            !calls
                .lock()
                .unwrap()
                .iter()
                .any(|call| matches!(call, GatewayCall::GetLimitation(_)))
        );
        assert_eq!(
            bus.messages().last().map(|(_, payload)| payload.as_str()),
            Some("ended.")
        );
    }
}
