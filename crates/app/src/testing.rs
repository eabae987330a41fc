//! Hand-written fakes shared by the unit tests of this crate.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use mqtt_velux_domain::error::{BusError, GatewayError};
use mqtt_velux_domain::node::{Limitation, Node, NodeKind, Position};
use mqtt_velux_domain::position::DevicePercent;

use crate::ports::{BusPublisher, DeviceGateway, UpdateSender};

/// Bus publisher that records every message.
#[derive(Debug, Clone, Default)]
pub struct RecordingBus {
    messages: Arc<Mutex<Vec<(String, String, bool)>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingBus {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(topic, payload, _)| (topic.clone(), payload.clone()))
            .collect()
    }

    pub fn topics(&self) -> Vec<String> {
        self.messages().into_iter().map(|(topic, _)| topic).collect()
    }

    /// Last payload published on `topic`.
    pub fn payload_of(&self, topic: &str) -> Option<String> {
        self.messages()
            .into_iter()
            .rev()
            .find(|(t, _)| t == topic)
            .map(|(_, payload)| payload)
    }

    pub fn all_retained(&self, retain: bool) -> bool {
        self.messages.lock().unwrap().iter().all(|(_, _, r)| *r == retain)
    }

    /// Make every later publish fail with [`BusError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl BusPublisher for RecordingBus {
    fn publish(&self, topic: String, payload: String, retain: bool) -> Result<(), BusError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }
        self.messages.lock().unwrap().push((topic, payload, retain));
        Ok(())
    }
}

/// One call observed by [`ScriptedGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Connect,
    Disconnect,
    LoadNodes,
    SetPosition(String, u8),
    GetLimitation(String),
    Register(String),
}

/// In-memory gateway with a shared call log.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    pub nodes: BTreeMap<String, Node>,
    pub limitations: HashMap<String, Limitation>,
    pub failing_limitations: HashSet<String>,
    pub fail_connect: bool,
    listeners: HashMap<String, Vec<UpdateSender>>,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
}

impl ScriptedGateway {
    pub fn with_window(mut self, name: &str, percent: Option<u8>, rain: u16) -> Self {
        self.with_node(name, NodeKind::Window, percent);
        self.limitations
            .insert(name.to_string(), Limitation::new(rain, 100).unwrap());
        self
    }

    pub fn with_node(&mut self, name: &str, kind: NodeKind, percent: Option<u8>) {
        let node = Node::builder()
            .name(name)
            .kind(kind)
            .position(percent.map(|p| DevicePercent::new(p).unwrap()))
            .build()
            .unwrap();
        self.nodes.insert(name.to_string(), node);
    }

    pub fn call_log(&self) -> Arc<Mutex<Vec<GatewayCall>>> {
        Arc::clone(&self.calls)
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn notify(&self, name: &str) {
        let (Some(node), Some(listeners)) = (self.nodes.get(name), self.listeners.get(name)) else {
            return;
        };
        for listener in listeners {
            let _ = listener.send(node.clone());
        }
    }
}

impl DeviceGateway for ScriptedGateway {
    async fn connect(&mut self) -> Result<(), GatewayError> {
        self.record(GatewayCall::Connect);
        if self.fail_connect {
            return Err(GatewayError::NotConnected);
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), GatewayError> {
        self.record(GatewayCall::Disconnect);
        Ok(())
    }

    async fn load_nodes(&mut self) -> Result<Vec<Node>, GatewayError> {
        self.record(GatewayCall::LoadNodes);
        Ok(self.nodes.values().cloned().collect())
    }

    fn node(&self, name: &str) -> Option<Node> {
        self.nodes.get(name).cloned()
    }

    async fn set_position(
        &mut self,
        name: &str,
        target: DevicePercent,
        _wait_for_completion: bool,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::SetPosition(name.to_string(), target.value()));
        let node = self
            .nodes
            .get_mut(name)
            .ok_or_else(|| GatewayError::NodeNotFound(name.to_string()))?;
        node.position = Position::Known(target);
        self.notify(name);
        Ok(())
    }

    async fn get_limitation(&mut self, name: &str) -> Result<Limitation, GatewayError> {
        self.record(GatewayCall::GetLimitation(name.to_string()));
        if self.failing_limitations.contains(name) {
            return Err(GatewayError::Transport("limitation timed out".into()));
        }
        self.limitations
            .get(name)
            .copied()
            .ok_or_else(|| GatewayError::NodeNotFound(name.to_string()))
    }

    fn register_device_updated(
        &mut self,
        name: &str,
        listener: UpdateSender,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::Register(name.to_string()));
        if !self.nodes.contains_key(name) {
            return Err(GatewayError::NodeNotFound(name.to_string()));
        }
        let listeners = self.listeners.entry(name.to_string()).or_default();
        if !listeners.iter().any(|known| known.same_channel(&listener)) {
            listeners.push(listener);
        }
        Ok(())
    }
}
