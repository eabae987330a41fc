//! Topic codec — inbound command topics and outbound state topics.
//!
//! Inbound: `prefix/<node>/<action>` (plus the special `prefix/echo`).
//! Outbound: `response/<node-path>/<attribute>`, where every `-` in the node
//! name becomes a `/` so `living-room` publishes under `living/room`.

use std::fmt;

use crate::error::MalformedTopic;

/// Node id that is not a device: payloads are echoed back verbatim.
pub const ECHO_NODE: &str = "echo";

/// Action keyword whose payload is a truthy/falsy flag.
pub const CLOSED_ACTION: &str = "closed";

/// Path under the response prefix carrying lifecycle and diagnostic messages.
pub const SYSTEM_PATH: &str = "mqtt-velux/system";

/// Action segment of a command topic, resolved once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `closed`: payload is a truthy/falsy flag.
    Closed,
    /// Any other label: payload is a requested position.
    SetPosition(String),
}

impl Action {
    #[must_use]
    pub fn parse(label: &str) -> Self {
        if label == CLOSED_ACTION {
            Self::Closed
        } else {
            Self::SetPosition(label.to_string())
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str(CLOSED_ACTION),
            Self::SetPosition(label) => f.write_str(label),
        }
    }
}

/// Structured view of an inbound topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundTopic {
    Echo,
    Command { node: String, action: Action },
}

impl InboundTopic {
    /// Classify `topic` received under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTopic`] when a non-echo topic lacks an action segment.
    pub fn parse(topic: &str, prefix: &str) -> Result<Self, MalformedTopic> {
        let remainder = strip_prefix(topic, prefix);
        let first = remainder.split('/').next().unwrap_or_default();
        if first == ECHO_NODE {
            return Ok(Self::Echo);
        }
        let (node, action) = parse_command_topic(topic, prefix)?;
        Ok(Self::Command {
            action: Action::parse(&action),
            node,
        })
    }
}

/// Remove the first occurrence of `prefix/` from `topic`.
fn strip_prefix(topic: &str, prefix: &str) -> String {
    let marker = format!("{prefix}/");
    match topic.find(&marker) {
        Some(at) => format!("{}{}", &topic[..at], &topic[at + marker.len()..]),
        None => topic.to_string(),
    }
}

/// Split a command topic into `(node, action)`.
///
/// The action is everything after the first `/` following the node, so it
/// may itself contain slashes.
///
/// # Errors
///
/// Returns [`MalformedTopic`] if fewer than two segments remain after the prefix.
pub fn parse_command_topic(topic: &str, prefix: &str) -> Result<(String, String), MalformedTopic> {
    let remainder = strip_prefix(topic, prefix);
    remainder
        .split_once('/')
        .map(|(node, action)| (node.to_string(), action.to_string()))
        .ok_or_else(|| MalformedTopic {
            topic: topic.to_string(),
        })
}

/// Outbound attributes published per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAttribute {
    Position,
    Closed,
    Rain,
}

impl StateAttribute {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Closed => "closed",
            Self::Rain => "rain",
        }
    }
}

impl fmt::Display for StateAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build `response/<node-path>/<attribute>`.
#[must_use]
pub fn build_state_topic(response_prefix: &str, device_name: &str, attribute: &str) -> String {
    let path = device_name.replace('-', "/");
    format!("{response_prefix}/{path}/{attribute}")
}

/// `response/echo`.
#[must_use]
pub fn echo_topic(response_prefix: &str) -> String {
    format!("{response_prefix}/{ECHO_NODE}")
}

/// `response/mqtt-velux/system/<channel>`, e.g. `message` or a log level.
#[must_use]
pub fn system_topic(response_prefix: &str, channel: &str) -> String {
    format!("{response_prefix}/{SYSTEM_PATH}/{channel}")
}
