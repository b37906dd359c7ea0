//! The change ledger.
//!
//! Registry operations mutate the model synchronously and append a
//! [`ChangeRecord`] describing what happened. The consumer drains the ledger
//! after each event and turns every record into display side effects, in the
//! order the mutations were issued.

use std::collections::VecDeque;

use serde::Serialize;

use super::client::{Client, ClientFlags, ClientId};
use super::geometry::Rect;
use super::workspace::{UserWorkspaceId, WorkspaceRef};

/// Geometry and flags of a client captured before a flag transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagSnapshot {
    pub geometry: Rect,
    pub float_geometry: Rect,
    pub flags: ClientFlags,
}

impl FlagSnapshot {
    #[must_use]
    pub const fn of(client: &Client) -> Self {
        Self {
            geometry: client.geometry,
            float_geometry: client.float_geometry,
            flags: client.flags,
        }
    }
}

/// A state transition awaiting its side effects.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRecord {
    /// Focus moved. Either side may be empty.
    Focus { from: Option<ClientId>, to: Option<ClientId> },
    /// A client was unmanaged. The record owns the client's last state.
    /// `workspace` may be a pseudo-workspace when the client died mid-drag;
    /// `origin` is then the user workspace it was dragged out of.
    Destroy {
        id: ClientId,
        client: Box<Client>,
        workspace: WorkspaceRef,
        origin: Option<UserWorkspaceId>,
    },
    Fullscreen { id: ClientId, enabled: bool, snapshot: FlagSnapshot },
    Above { id: ClientId, enabled: bool, snapshot: FlagSnapshot },
    Below { id: ClientId, enabled: bool, snapshot: FlagSnapshot },
    Urgent { id: ClientId, enabled: bool },
    Iconify { id: ClientId, enabled: bool },
    Disown { id: ClientId, enabled: bool, snapshot: FlagSnapshot },
    Sticky { id: ClientId, enabled: bool },
    /// A client changed workspace. `None` marks a pseudo-workspace (or no
    /// workspace at all for a freshly managed client); the consumer skips
    /// mapping on that side.
    WorkspaceMove {
        id: ClientId,
        from: Option<UserWorkspaceId>,
        to: Option<UserWorkspaceId>,
    },
    ContextMove { id: ClientId, from: usize, to: usize },
    WorkspaceActivate { context: usize, from: usize, to: usize },
    ContextActivate { from: usize, to: usize },
    /// Layout parameters of a workspace changed.
    Arrange { workspace: UserWorkspaceId, sidebar_changed: bool },
}

/// Tag of a [`ChangeRecord`], used for logging and for observing the order
/// in which records are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Focus,
    Destroy,
    Fullscreen,
    Above,
    Below,
    Urgent,
    Iconify,
    Disown,
    Sticky,
    WorkspaceMove,
    ContextMove,
    WorkspaceActivate,
    ContextActivate,
    Arrange,
}

impl ChangeRecord {
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Focus { .. } => RecordKind::Focus,
            Self::Destroy { .. } => RecordKind::Destroy,
            Self::Fullscreen { .. } => RecordKind::Fullscreen,
            Self::Above { .. } => RecordKind::Above,
            Self::Below { .. } => RecordKind::Below,
            Self::Urgent { .. } => RecordKind::Urgent,
            Self::Iconify { .. } => RecordKind::Iconify,
            Self::Disown { .. } => RecordKind::Disown,
            Self::Sticky { .. } => RecordKind::Sticky,
            Self::WorkspaceMove { .. } => RecordKind::WorkspaceMove,
            Self::ContextMove { .. } => RecordKind::ContextMove,
            Self::WorkspaceActivate { .. } => RecordKind::WorkspaceActivate,
            Self::ContextActivate { .. } => RecordKind::ContextActivate,
            Self::Arrange { .. } => RecordKind::Arrange,
        }
    }
}

/// FIFO queue of change records.
#[derive(Debug, Default)]
pub struct ChangeLedger {
    queue: VecDeque<ChangeRecord>,
}

impl ChangeLedger {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn enqueue(&mut self, record: ChangeRecord) {
        tracing::trace!(kind = ?record.kind(), pending = self.queue.len(), "ledger: enqueue");
        self.queue.push_back(record);
    }

    #[must_use]
    pub fn has_pending(&self) -> bool { !self.queue.is_empty() }

    /// Takes the oldest record.
    pub fn dequeue_next(&mut self) -> Option<ChangeRecord> { self.queue.pop_front() }

    /// Discards every pending record, returning how many were dropped.
    pub fn drain_all(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    #[must_use]
    pub fn len(&self) -> usize { self.queue.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.queue.is_empty() }

    /// Kinds of the pending records, oldest first.
    pub fn kinds(&self) -> impl Iterator<Item = RecordKind> + '_ {
        self.queue.iter().map(ChangeRecord::kind)
    }
}
