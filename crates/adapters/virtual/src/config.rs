//! Configured nodes of the virtual gateway.

use serde::Deserialize;

use mqtt_velux_domain::node::NodeKind;
use mqtt_velux_domain::position::DevicePercent;

/// One simulated node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VirtualNodeConfig {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: NodeKind,
    /// Device-convention position; absent means the hub has not reported one.
    #[serde(default)]
    pub position: Option<DevicePercent>,
    #[serde(default)]
    pub limitation_min: u16,
    #[serde(default = "default_limitation_max")]
    pub limitation_max: u16,
}

fn default_kind() -> NodeKind {
    NodeKind::Window
}

fn default_limitation_max() -> u16 {
    100
}

impl VirtualNodeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: default_kind(),
            position: None,
            limitation_min: 0,
            limitation_max: default_limitation_max(),
        }
    }
}
