//! Command — a validated request to move one node.

use std::fmt;

use crate::position::{BusPercent, DevicePercent};

/// Move `node` to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub node: String,
    pub target: DevicePercent,
}

impl Command {
    #[must_use]
    pub fn set_position(node: impl Into<String>, target: DevicePercent) -> Self {
        Self {
            node: node.into(),
            target,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "set {} to device {}% (bus {}%)",
            self.node,
            self.target,
            BusPercent::from(self.target)
        )
    }
}
