//! Handle for communicating with the window manager actor.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::messages::WmMessage;
use crate::wm::events::{Command, ProtocolEvent};
use crate::wm::snapshot::StateSnapshot;

/// Error types for actor communication.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// The actor has stopped.
    #[error("failed to send message to the window manager: channel closed")]
    SendFailed,

    /// The actor dropped the response channel.
    #[error("failed to receive response from the window manager: channel closed")]
    ReceiveFailed,

    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

/// Cloneable sender side of the actor.
#[derive(Debug, Clone)]
pub struct WmHandle {
    sender: mpsc::Sender<WmMessage>,
}

impl WmHandle {
    pub(crate) const fn new(sender: mpsc::Sender<WmMessage>) -> Self { Self { sender } }

    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Queues a message without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: WmMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Queues a message, waiting for room in the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: WmMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn event(&self, event: ProtocolEvent) -> Result<(), ActorError> {
        self.send_async(WmMessage::Event(event)).await
    }

    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn command(&self, command: Command) -> Result<(), ActorError> {
        self.send_async(WmMessage::Command(command)).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns a snapshot taken after every message sent before it.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the actor stopped before answering.
    pub async fn snapshot(&self) -> Result<StateSnapshot, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.send_async(WmMessage::Snapshot { respond_to: tx }).await?;
        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// [`Self::snapshot`] with a deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if no answer arrives in time, or any
    /// error from [`Self::snapshot`].
    pub async fn snapshot_timeout(&self, timeout: Duration) -> Result<StateSnapshot, ActorError> {
        tokio::time::timeout(timeout, self.snapshot())
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    /// Asks the actor to stop.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor has already stopped.
    pub async fn shutdown(&self) -> Result<(), ActorError> {
        self.send_async(WmMessage::Shutdown).await
    }

    /// Whether the actor has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.sender.is_closed() }
}
