//! Error types shared across the workspace.
//!
//! The first three kinds are local to a single inbound message: they are
//! logged and the message is dropped. Gateway and bus failures are logged
//! and the bridge keeps running. Only [`BridgeError::Startup`] is fatal.

use std::error::Error as StdError;

/// Boxed transport error raised by an adapter.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Top-level error for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("malformed topic")]
    MalformedTopic(#[from] MalformedTopic),

    #[error("unknown device")]
    UnknownDevice(#[from] UnknownDevice),

    #[error("invalid position")]
    InvalidPosition(#[from] InvalidPosition),

    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("gateway error")]
    Gateway(#[from] GatewayError),

    #[error("bus error")]
    Bus(#[from] BusError),

    /// Bring-up could not complete. Fatal.
    #[error("startup failed while {stage}")]
    Startup {
        stage: &'static str,
        #[source]
        source: Box<BridgeError>,
    },
}

impl BridgeError {
    /// Wrap any error raised during bring-up into [`BridgeError::Startup`].
    pub fn startup(stage: &'static str, source: impl Into<BridgeError>) -> Self {
        Self::Startup {
            stage,
            source: Box::new(source.into()),
        }
    }

    /// Whether this error only concerns the message that caused it.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::MalformedTopic(_) | Self::UnknownDevice(_) | Self::InvalidPosition(_)
        )
    }
}

/// A bus topic that does not split into `<node>/<action>` after the prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("topic {topic:?} has no <node>/<action> after the prefix")]
pub struct MalformedTopic {
    pub topic: String,
}

/// A command addressed to a node the gateway did not report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node: {node}")]
pub struct UnknownDevice {
    pub node: String,
}

/// A requested position that does not translate into 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid position: {value:?}")]
pub struct InvalidPosition {
    pub value: String,
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("limitation minimum {min} exceeds maximum {max}")]
    InvertedLimitation { min: u16, max: u16 },
}

/// Failure surfaced by the device gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway not connected")]
    NotConnected,

    #[error("gateway does not know node {0:?}")]
    NodeNotFound(String),

    #[error("gateway transport error")]
    Transport(#[source] BoxError),
}

/// Failure surfaced by the pub/sub client.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("bus client closed")]
    Closed,

    #[error("bus transport error")]
    Transport(#[source] BoxError),
}
