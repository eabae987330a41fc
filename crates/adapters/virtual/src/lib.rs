//! # mqtt-velux-adapter-virtual
//!
//! In-process stand-in for the actuator hub.
//!
//! Nodes come from configuration. Moves complete instantly: `set_position`
//! stores the target and notifies every listener registered for the node.
//! Limitations are the configured bounds.
//!
//! ## Dependency rule
//!
//! Depends on `mqtt-velux-app` (port traits) and `mqtt-velux-domain` only.

pub mod config;
pub mod error;

use std::collections::{HashMap, HashSet};

use mqtt_velux_app::ports::{DeviceGateway, UpdateSender};
use mqtt_velux_domain::error::{GatewayError, ValidationError};
use mqtt_velux_domain::node::{Limitation, Node, Position};
use mqtt_velux_domain::position::DevicePercent;

pub use config::VirtualNodeConfig;
pub use error::VirtualGatewayError;

/// Simulated gateway holding the configured nodes.
#[derive(Debug, Default)]
pub struct VirtualGateway {
    connected: bool,
    nodes: Vec<Node>,
    limitations: HashMap<String, Limitation>,
    listeners: HashMap<String, Vec<UpdateSender>>,
}

impl VirtualGateway {
    /// Build a gateway from configured nodes, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualGatewayError::InvalidNode`] for an empty name or an
    /// inverted limitation, and [`VirtualGatewayError::DuplicateNode`] when a
    /// name repeats.
    pub fn new(configs: &[VirtualNodeConfig]) -> Result<Self, VirtualGatewayError> {
        let mut gateway = Self::default();
        let mut seen = HashSet::new();
        for config in configs {
            let invalid = |source| VirtualGatewayError::InvalidNode {
                name: config.name.clone(),
                source,
            };
            if config.name.is_empty() {
                return Err(invalid(ValidationError::EmptyName));
            }
            if !seen.insert(config.name.as_str()) {
                return Err(VirtualGatewayError::DuplicateNode(config.name.clone()));
            }
            let limitation =
                Limitation::new(config.limitation_min, config.limitation_max).map_err(invalid)?;

            gateway.nodes.push(Node {
                name: config.name.clone(),
                kind: config.kind,
                position: Position::from(config.position),
            });
            gateway.limitations.insert(config.name.clone(), limitation);
        }
        Ok(gateway)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn ensure_connected(&self) -> Result<(), VirtualGatewayError> {
        if self.connected {
            Ok(())
        } else {
            Err(VirtualGatewayError::NotConnected)
        }
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut Node, VirtualGatewayError> {
        self.nodes
            .iter_mut()
            .find(|node| node.name == name)
            .ok_or_else(|| VirtualGatewayError::UnknownNode(name.to_string()))
    }

    /// Push `node` to its listeners, forgetting the ones whose receiver is gone.
    fn notify(&mut self, node: &Node) {
        if let Some(listeners) = self.listeners.get_mut(&node.name) {
            listeners.retain(|listener| listener.send(node.clone()).is_ok());
        }
    }
}

impl DeviceGateway for VirtualGateway {
    async fn connect(&mut self) -> Result<(), GatewayError> {
        tracing::debug!(nodes = self.nodes.len(), "virtual gateway connected");
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), GatewayError> {
        tracing::debug!("virtual gateway disconnected");
        self.connected = false;
        Ok(())
    }

    async fn load_nodes(&mut self) -> Result<Vec<Node>, GatewayError> {
        self.ensure_connected()?;
        Ok(self.nodes.clone())
    }

    fn node(&self, name: &str) -> Option<Node> {
        self.nodes.iter().find(|node| node.name == name).cloned()
    }

    async fn set_position(
        &mut self,
        name: &str,
        target: DevicePercent,
        wait_for_completion: bool,
    ) -> Result<(), GatewayError> {
        self.ensure_connected()?;
        let node = self.find_mut(name)?;
        node.position = Position::Known(target);
        let snapshot = node.clone();
        tracing::debug!(node = %snapshot, wait_for_completion, "virtual node moved");
        self.notify(&snapshot);
        Ok(())
    }

    async fn get_limitation(&mut self, name: &str) -> Result<Limitation, GatewayError> {
        self.ensure_connected()?;
        self.limitations
            .get(name)
            .copied()
            .ok_or_else(|| VirtualGatewayError::UnknownNode(name.to_string()).into())
    }

    fn register_device_updated(
        &mut self,
        name: &str,
        listener: UpdateSender,
    ) -> Result<(), GatewayError> {
        if self.node(name).is_none() {
            return Err(VirtualGatewayError::UnknownNode(name.to_string()).into());
        }
        let listeners = self.listeners.entry(name.to_string()).or_default();
        if !listeners.iter().any(|known| known.same_channel(&listener)) {
            listeners.push(listener);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mqtt_velux_domain::node::NodeKind;
    use tokio::sync::mpsc;

    use super::*;

    fn kitchen() -> VirtualNodeConfig {
        VirtualNodeConfig {
            position: Some(DevicePercent::new(50).unwrap()),
            limitation_min: 4,
            ..VirtualNodeConfig::new("kitchen")
        }
    }

    async fn connected(configs: &[VirtualNodeConfig]) -> VirtualGateway {
        let mut gateway = VirtualGateway::new(configs).unwrap();
        gateway.connect().await.unwrap();
        gateway
    }

    #[tokio::test]
    async fn should_load_nodes_in_configured_order() {
        let mut gateway = connected(&[
            VirtualNodeConfig::new("living-room"),
            kitchen(),
            VirtualNodeConfig {
                kind: NodeKind::Light,
                ..VirtualNodeConfig::new("attic")
            },
        ])
        .await;

        let names: Vec<_> = gateway
            .load_nodes()
            .await
            .unwrap()
            .into_iter()
            .map(|node| node.name)
            .collect();

        assert_eq!(names, ["living-room", "kitchen", "attic"]);
    }

    #[tokio::test]
    async fn should_report_unknown_position_when_not_configured() {
        let gateway = connected(&[VirtualNodeConfig::new("bath")]).await;
        assert_eq!(gateway.node("bath").unwrap().position, Position::Unknown);
    }

    #[tokio::test]
    async fn should_fail_while_disconnected() {
        let mut gateway = VirtualGateway::new(&[kitchen()]).unwrap();

        assert!(matches!(gateway.load_nodes().await, Err(GatewayError::NotConnected)));
        assert!(matches!(
            gateway.set_position("kitchen", DevicePercent::OPEN, false).await,
            Err(GatewayError::NotConnected)
        ));
        assert!(matches!(
            gateway.get_limitation("kitchen").await,
            Err(GatewayError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn should_fail_again_after_disconnect() {
        let mut gateway = connected(&[kitchen()]).await;
        gateway.disconnect().await.unwrap();

        assert!(!gateway.is_connected());
        assert!(gateway.load_nodes().await.is_err());
    }

    #[tokio::test]
    async fn should_move_node_and_notify_listener() {
        let mut gateway = connected(&[kitchen()]).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        gateway.register_device_updated("kitchen", tx).unwrap();

        gateway
            .set_position("kitchen", DevicePercent::new(70).unwrap(), false)
            .await
            .unwrap();

        let update = rx.try_recv().unwrap();
        assert_eq!(update.position, Position::Known(DevicePercent::new(70).unwrap()));
        assert_eq!(gateway.node("kitchen").unwrap().position, update.position);
    }

    #[tokio::test]
    async fn should_notify_once_per_channel_when_registered_twice() {
        let mut gateway = connected(&[kitchen()]).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        gateway.register_device_updated("kitchen", tx.clone()).unwrap();
        gateway.register_device_updated("kitchen", tx).unwrap();

        gateway
            .set_position("kitchen", DevicePercent::CLOSED, false)
            .await
            .unwrap();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_drop_listeners_whose_receiver_is_gone() {
        let mut gateway = connected(&[kitchen()]).await;
        let (tx, rx) = mpsc::unbounded_channel();
        gateway.register_device_updated("kitchen", tx).unwrap();
        drop(rx);

        gateway
            .set_position("kitchen", DevicePercent::OPEN, false)
            .await
            .unwrap();

        assert!(gateway.listeners["kitchen"].is_empty());
    }

    #[tokio::test]
    async fn should_return_configured_limitation() {
        let mut gateway = connected(&[kitchen()]).await;
        assert_eq!(
            gateway.get_limitation("kitchen").await.unwrap(),
            Limitation::new(4, 100).unwrap()
        );
    }

    #[tokio::test]
    async fn should_reject_unknown_node() {
        let mut gateway = connected(&[kitchen()]).await;
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(matches!(
            gateway.set_position("garage", DevicePercent::OPEN, false).await,
            Err(GatewayError::NodeNotFound(_))
        ));
        assert!(matches!(
            gateway.register_device_updated("garage", tx),
            Err(GatewayError::NodeNotFound(_))
        ));
    }

    #[test]
    fn should_reject_duplicate_names() {
        let result = VirtualGateway::new(&[kitchen(), kitchen()]);
        assert!(matches!(result, Err(VirtualGatewayError::DuplicateNode(_))));
    }

    #[test]
    fn should_reject_inverted_limitation() {
        let config = VirtualNodeConfig {
            limitation_min: 80,
            limitation_max: 20,
            ..VirtualNodeConfig::new("kitchen")
        };
        assert!(matches!(
            VirtualGateway::new(&[config]),
            Err(VirtualGatewayError::InvalidNode {
                source: ValidationError::InvertedLimitation { min: 80, max: 20 },
                ..
            })
        ));
    }
}
