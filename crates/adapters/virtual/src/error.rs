//! Virtual gateway error types.

use mqtt_velux_domain::error::{BridgeError, GatewayError, ValidationError};

/// Errors specific to the virtual gateway.
#[derive(Debug, thiserror::Error)]
pub enum VirtualGatewayError {
    /// An operation needed the link but the gateway is disconnected.
    #[error("virtual gateway is not connected")]
    NotConnected,

    #[error("unknown virtual node {0:?}")]
    UnknownNode(String),

    /// Two configured nodes share a name.
    #[error("duplicate virtual node {0:?}")]
    DuplicateNode(String),

    /// A configured node violates a domain invariant.
    #[error("invalid virtual node {name:?}")]
    InvalidNode {
        name: String,
        #[source]
        source: ValidationError,
    },
}

impl From<VirtualGatewayError> for GatewayError {
    fn from(err: VirtualGatewayError) -> Self {
        match err {
            VirtualGatewayError::NotConnected => Self::NotConnected,
            VirtualGatewayError::UnknownNode(name) => Self::NodeNotFound(name),
            other => Self::Transport(Box::new(other)),
        }
    }
}

impl From<VirtualGatewayError> for BridgeError {
    fn from(err: VirtualGatewayError) -> Self {
        Self::Gateway(err.into())
    }
}
