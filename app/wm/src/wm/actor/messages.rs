//! Message types for the window manager actor.

use tokio::sync::oneshot;

use crate::wm::events::{Command, ProtocolEvent};
use crate::wm::snapshot::StateSnapshot;

/// Messages sent to the actor.
#[derive(Debug)]
pub enum WmMessage {
    /// Protocol event from the display.
    Event(ProtocolEvent),

    /// User command from a binding or the IPC channel.
    Command(Command),

    /// Request a snapshot of the model.
    Snapshot { respond_to: oneshot::Sender<StateSnapshot> },

    /// Stop the actor after discarding any pending change records.
    Shutdown,
}

impl WmMessage {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Event(event) => event.name(),
            Self::Command(_) => "command",
            Self::Snapshot { .. } => "snapshot",
            Self::Shutdown => "shutdown",
        }
    }
}
