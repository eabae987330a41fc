//! Command router — entry point for inbound bus messages.
//!
//! Runs in the bus client's receive context. It only parses, validates, and
//! submits; it never waits for the gateway.

use mqtt_velux_domain::command::Command;
use mqtt_velux_domain::error::{BridgeError, InvalidPosition, UnknownDevice};
use mqtt_velux_domain::position::{translate, translate_closed_flag};
use mqtt_velux_domain::topic::{Action, InboundTopic};

use crate::directory::DirectoryReader;
use crate::ports::BusPublisher;
use crate::publisher::StatePublisher;
use crate::scheduler::CommandScheduler;

/// What the router did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// The payload was echoed back; no device was involved.
    Echoed,
    /// A command was handed to the bridge task.
    Submitted(Command),
    /// The command was valid but the bridge task is gone.
    Dropped(Command),
}

/// Turns `(topic, payload)` pairs into scheduled [`Command`]s.
#[derive(Debug, Clone)]
pub struct CommandRouter<P> {
    prefix: String,
    scheduler: CommandScheduler,
    directory: DirectoryReader,
    publisher: StatePublisher<P>,
}

impl<P: BusPublisher> CommandRouter<P> {
    pub fn new(
        prefix: impl Into<String>,
        scheduler: CommandScheduler,
        directory: DirectoryReader,
        publisher: StatePublisher<P>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            scheduler,
            directory,
            publisher,
        }
    }

    /// Topic filter covering every inbound message.
    #[must_use]
    pub fn subscription(&self) -> String {
        format!("{}/#", self.prefix)
    }

    /// Route one message, logging and dropping it on failure.
    pub fn handle(&self, topic: &str, payload: &[u8]) {
        match self.route(topic, payload) {
            Ok(Routed::Dropped(command)) => {
                tracing::debug!(%command, "bridge stopped, command dropped");
            }
            Ok(_) => {}
            Err(err) if err.is_local() => {
                tracing::error!(%err, detail = ?err, topic, "rejected message");
            }
            Err(err) => tracing::warn!(%err, detail = ?err, topic, "failed to answer message"),
        }
    }

    /// Route one message.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MalformedTopic`], [`BridgeError::UnknownDevice`],
    /// or [`BridgeError::InvalidPosition`] when the message cannot become a
    /// command, and [`BridgeError::Bus`] when an echo cannot be published.
    pub fn route(&self, topic: &str, payload: &[u8]) -> Result<Routed, BridgeError> {
        let (node, action) = match InboundTopic::parse(topic, &self.prefix)? {
            InboundTopic::Echo => {
                // Invalid UTF-8 sequences are echoed as U+FFFD.
                self.publisher.publish_echo(&String::from_utf8_lossy(payload))?;
                return Ok(Routed::Echoed);
            }
            InboundTopic::Command { node, action } => (node, action),
        };

        let text = std::str::from_utf8(payload).map_err(|_| InvalidPosition {
            value: String::from_utf8_lossy(payload).into_owned(),
        })?;

        let payload = text.to_lowercase();
        tracing::info!(
            topic,
            node = %node,
            action = %action,
            payload = %payload,
            "message received"
        );

        if !self.directory.borrow().contains(&node) {
            return Err(UnknownDevice { node }.into());
        }

        let target = match action {
            Action::Closed => translate_closed_flag(&payload),
            Action::SetPosition(_) => translate(&payload)?,
        };
        tracing::info!(node = %node, percent = target.value(), "setting position");

        let command = Command::set_position(node, target);
        match self.scheduler.submit(command.clone()) {
            Ok(()) => Ok(Routed::Submitted(command)),
            Err(closed) => Ok(Routed::Dropped(closed.0)),
        }
    }
}
