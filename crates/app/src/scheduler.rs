//! Cross-context scheduler — the only crossing from the bus client's
//! receive context into the bridge task.
//!
//! [`CommandScheduler::submit`] enqueues and returns immediately; the bridge
//! task drains the [`CommandQueue`] one command at a time in submission
//! order. There is no cancellation: once the queue is dropped at shutdown,
//! pending commands are discarded.

use tokio::sync::mpsc;

use mqtt_velux_domain::command::Command;

/// The bridge task is gone; the command was not queued.
#[derive(Debug, thiserror::Error)]
#[error("command queue closed, dropping: {0}")]
pub struct QueueClosed(pub Command);

/// Create a connected scheduler/queue pair.
#[must_use]
pub fn channel() -> (CommandScheduler, CommandQueue) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (CommandScheduler { sender }, CommandQueue { receiver })
}

/// Submitting half. Cheap to clone, safe to share across threads.
#[derive(Debug, Clone)]
pub struct CommandScheduler {
    sender: mpsc::UnboundedSender<Command>,
}

impl CommandScheduler {
    /// Enqueue `command` for the bridge task without waiting for it to run.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClosed`] when the bridge task has shut down.
    pub fn submit(&self, command: Command) -> Result<(), QueueClosed> {
        self.sender
            .send(command)
            .map_err(|mpsc::error::SendError(command)| QueueClosed(command))
    }
}

/// Draining half, owned by the bridge task.
#[derive(Debug)]
pub struct CommandQueue {
    receiver: mpsc::UnboundedReceiver<Command>,
}

impl CommandQueue {
    /// Next command in submission order, or `None` once every scheduler is gone.
    pub async fn recv(&mut self) -> Option<Command> {
        self.receiver.recv().await
    }
}
