//! Window manager actor.
//!
//! The actor owns the [`WindowManager`] and processes messages one at a
//! time: every event or command is fully applied, ledger drain included,
//! before the next message is received. There is no other mutator, so the
//! model needs no locking.
//!
//! # Panic Recovery
//!
//! A panic while handling one message is caught and logged, and the actor
//! carries on with the next message. The model may be left inconsistent; the
//! log says so.

mod handle;
mod messages;

use std::panic::{AssertUnwindSafe, catch_unwind};

pub use handle::{ActorError, WmHandle};
pub use messages::WmMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::backend::Backend;
use super::manager::WindowManager;

/// Channel buffer size for the actor.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Actor owning the window manager.
pub struct WmActor<B: Backend> {
    manager: WindowManager<B>,
    receiver: mpsc::Receiver<WmMessage>,
}

impl<B: Backend + Send + 'static> WmActor<B> {
    /// Spawns the actor on the current tokio runtime.
    ///
    /// # Returns
    ///
    /// A handle for sending messages, and the task, which yields the manager
    /// back once the actor stops.
    #[must_use]
    pub fn spawn(manager: WindowManager<B>) -> (WmHandle, JoinHandle<WindowManager<B>>) {
        tracing::debug!("spawning window manager actor");
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let actor = Self { manager, receiver };
        let task = tokio::spawn(actor.run());
        (WmHandle::new(sender), task)
    }

    async fn run(mut self) -> WindowManager<B> {
        tracing::trace!("actor message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, WmMessage::Shutdown) {
                let dropped = self.manager.registry_mut().flush_changes();
                tracing::debug!(dropped, "actor received shutdown");
                return self.manager;
            }

            let name = msg.name();
            let result = catch_unwind(AssertUnwindSafe(|| self.handle_message(msg)));
            if let Err(panic) = result {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(msg = name, %detail, "panic while handling message, model may be inconsistent");
            }
        }

        tracing::debug!("actor channel closed, exiting");
        self.manager
    }

    fn handle_message(&mut self, msg: WmMessage) {
        match msg {
            WmMessage::Event(event) => {
                self.manager.handle_event(event);
            }
            WmMessage::Command(command) => {
                self.manager.handle_command(command);
            }
            WmMessage::Snapshot { respond_to } => {
                // The requester may have given up
                let _ = respond_to.send(self.manager.snapshot());
            }
            WmMessage::Shutdown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::wm::backend::{RecordingBackend, WindowAttributes};
    use crate::wm::events::{Command, ProtocolEvent};
    use crate::wm::geometry::Rect;

    fn manager() -> WindowManager<RecordingBackend> {
        let backend = RecordingBackend::new(Rect::new(0, 0, 800, 600));
        WindowManager::new(&Config::default(), backend).unwrap()
    }

    #[tokio::test]
    async fn test_messages_are_processed_in_order() {
        let (handle, task) = WmActor::spawn(manager());
        for window in 1..=3 {
            let attributes = WindowAttributes { window, ..WindowAttributes::default() };
            handle.event(ProtocolEvent::MapRequest { attributes }).await.unwrap();
        }
        handle.command(Command::FocusNext).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.workspaces[0].live, vec![1, 2, 3]);
        assert_eq!(snapshot.focused, Some(1));

        handle.shutdown().await.unwrap();
        let manager = task.await.unwrap();
        assert_eq!(manager.registry().client_count(), 3);
        assert!(!manager.registry().has_pending_changes());
    }

    #[tokio::test]
    async fn test_send_fails_after_shutdown() {
        let (handle, task) = WmActor::spawn(manager());
        handle.shutdown().await.unwrap();
        task.await.unwrap();
        assert!(handle.is_closed());
        assert!(matches!(handle.snapshot().await, Err(ActorError::SendFailed)));
        assert!(matches!(handle.send(WmMessage::Shutdown), Err(ActorError::SendFailed)));
    }

    #[tokio::test]
    async fn test_snapshot_timeout_answers_in_time() {
        let (handle, _task) = WmActor::spawn(manager());
        let snapshot = handle.snapshot_timeout(Duration::from_secs(5)).await.unwrap();
        assert_eq!(snapshot.context, 'a');
        assert_eq!(snapshot.workspace, 1);
    }
}
