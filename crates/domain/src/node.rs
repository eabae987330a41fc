//! Node — a single actuator reported by the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, ValidationError};
use crate::position::DevicePercent;

/// Node types the gateway reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Window,
    RollerShutter,
    Blind,
    Awning,
    GarageDoor,
    Gate,
    RollingDoor,
    Blade,
    OnOffSwitch,
    Light,
}

impl NodeKind {
    /// Whether the node carries an opening position.
    #[must_use]
    pub fn is_opening(self) -> bool {
        !matches!(self, Self::OnOffSwitch | Self::Light)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Window => "Window",
            Self::RollerShutter => "RollerShutter",
            Self::Blind => "Blind",
            Self::Awning => "Awning",
            Self::GarageDoor => "GarageDoor",
            Self::Gate => "Gate",
            Self::RollingDoor => "RollingDoor",
            Self::Blade => "Blade",
            Self::OnOffSwitch => "OnOffSwitch",
            Self::Light => "Light",
        };
        f.write_str(name)
    }
}

/// Current position as last reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    Known(DevicePercent),
    #[default]
    Unknown,
}

impl Position {
    #[must_use]
    pub fn percent(self) -> Option<DevicePercent> {
        match self {
            Self::Known(percent) => Some(percent),
            Self::Unknown => None,
        }
    }
}

impl From<Option<DevicePercent>> for Position {
    fn from(value: Option<DevicePercent>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl From<DevicePercent> for Position {
    fn from(percent: DevicePercent) -> Self {
        Self::Known(percent)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(percent) => write!(f, "{percent} %"),
            Self::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// Device-reported numeric bounds.
///
/// `min_value` is surfaced on the bus as the `rain` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Limitation {
    pub min_value: u16,
    pub max_value: u16,
}

impl Limitation {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedLimitation`] when `min_value > max_value`.
    pub fn new(min_value: u16, max_value: u16) -> Result<Self, ValidationError> {
        if min_value > max_value {
            return Err(ValidationError::InvertedLimitation {
                min: min_value,
                max: max_value,
            });
        }
        Ok(Self {
            min_value,
            max_value,
        })
    }
}

/// Snapshot of an actuator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub position: Position,
}

impl Node {
    /// Create a builder for constructing a [`Node`].
    #[must_use]
    pub fn builder() -> NodeBuilder {
        NodeBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} name=\"{}\" position=\"{}\"/>",
            self.kind, self.name, self.position
        )
    }
}

/// Step-by-step builder for [`Node`].
#[derive(Debug)]
pub struct NodeBuilder {
    name: Option<String>,
    kind: NodeKind,
    position: Position,
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self {
            name: None,
            kind: NodeKind::Window,
            position: Position::Unknown,
        }
    }
}

impl NodeBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn position(mut self, position: impl Into<Position>) -> Self {
        self.position = position.into();
        self
    }

    /// Consume the builder, validate, and return a [`Node`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Node, BridgeError> {
        let node = Node {
            name: self.name.unwrap_or_default(),
            kind: self.kind,
            position: self.position,
        };
        node.validate()?;
        Ok(node)
    }
}
