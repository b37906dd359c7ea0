//! Interactive move/resize.
//!
//! A client being dragged leaves its workspace for the matching
//! pseudo-workspace, so no user workspace ever holds it twice mid-drag. The
//! interaction remembers where it came from and is returned there when the
//! button is released or the interaction is cancelled.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Registry;
use crate::wm::client::ClientId;
use crate::wm::geometry::{Rect, WindowId};
use crate::wm::layout::LayoutMode;
use crate::wm::ledger::ChangeRecord;
use crate::wm::workspace::{UserWorkspaceId, WorkspaceRef};

/// Kind of pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum InteractionKind {
    Move,
    Resize,
}

impl InteractionKind {
    const fn workspace(self) -> WorkspaceRef {
        match self {
            Self::Move => WorkspaceRef::Move,
            Self::Resize => WorkspaceRef::Resize,
        }
    }
}

/// An ongoing move or resize.
#[derive(Debug, Clone, Copy)]
pub(super) struct Interaction {
    pub(super) client: ClientId,
    pub(super) kind: InteractionKind,
    pub(super) origin: UserWorkspaceId,
    /// Pointer position when the button went down.
    pointer: (i32, i32),
    /// Floating geometry when the button went down.
    start: Rect,
}

impl Registry {
    #[must_use]
    pub fn interaction_client(&self) -> Option<ClientId> {
        self.interaction.as_ref().map(|interaction| interaction.client)
    }

    #[must_use]
    pub fn interaction_kind(&self) -> Option<InteractionKind> {
        self.interaction.as_ref().map(|interaction| interaction.kind)
    }

    pub fn start_moving(&mut self, id: ClientId, x: i32, y: i32) -> bool {
        self.start_interaction(id, InteractionKind::Move, (x, y))
    }

    pub fn start_resizing(&mut self, id: ClientId, x: i32, y: i32) -> bool {
        self.start_interaction(id, InteractionKind::Resize, (x, y))
    }

    /// Only floating, top-level, non-sticky live clients may be dragged;
    /// under the floating layout every client counts as floating.
    fn start_interaction(&mut self, id: ClientId, kind: InteractionKind, pointer: (i32, i32)) -> bool {
        if self.interaction.is_some() {
            tracing::debug!("interaction already in progress");
            return false;
        }
        let Some(client) = self.clients.get(id) else {
            return false;
        };
        let Some(WorkspaceRef::User(origin)) = self.placement.get(id).copied() else {
            return false;
        };
        let Some(ws) = self.workspace(origin) else {
            return false;
        };
        let floating = client.flags.floating || ws.layout.mode == LayoutMode::Floating;
        if client.parent.is_some()
            || client.flags.sticky
            || !floating
            || client.is_out_of_window_fullscreen()
            || !ws.live.contains(id)
        {
            tracing::debug!(window = client.window, ?kind, "client cannot be dragged");
            return false;
        }
        let start = client.float_geometry;

        let family = self.family(id);
        if let Some(ws) = self.workspace_mut(origin) {
            ws.remove_family(&family);
        }
        for &member in &family {
            self.placement.insert(member, kind.workspace());
        }
        self.interaction = Some(Interaction { client: id, kind, origin, pointer, start });
        tracing::debug!(?kind, workspace = %origin, "interaction started");
        self.record(ChangeRecord::WorkspaceMove { id, from: Some(origin), to: None });
        self.unfocus_if_focused(id);
        true
    }

    /// Applies pointer motion to the dragged client.
    ///
    /// # Returns
    ///
    /// The frame and its new geometry, for immediate application.
    pub fn motion(&mut self, x: i32, y: i32) -> Option<(WindowId, Rect)> {
        let interaction = self.interaction?;
        let client = self.clients.get_mut(interaction.client)?;
        let dx = x.saturating_sub(interaction.pointer.0);
        let dy = y.saturating_sub(interaction.pointer.1);
        let start = interaction.start;

        let geometry = match interaction.kind {
            InteractionKind::Move => start.translate(dx, dy),
            InteractionKind::Resize => {
                let (width, height) = client
                    .hints
                    .constrain(start.width.saturating_add(dx), start.height.saturating_add(dy));
                Rect::new(start.x, start.y, width, height)
            }
        };
        client.float_geometry = geometry;
        client.geometry = geometry;
        Some((client.frame, geometry))
    }

    pub fn stop_moving(&mut self) -> bool { self.stop_interaction(InteractionKind::Move) }

    pub fn stop_resizing(&mut self) -> bool { self.stop_interaction(InteractionKind::Resize) }

    /// Commits the geometry and returns the client to its workspace.
    fn stop_interaction(&mut self, kind: InteractionKind) -> bool {
        if self.interaction_kind() != Some(kind) {
            return false;
        }
        let Some(id) = self.finish_interaction() else {
            return false;
        };
        self.focus(id, false);
        true
    }

    /// Aborts the interaction, restoring the geometry it started with.
    /// Repeated calls are no-ops.
    pub fn cancel_interaction(&mut self) -> bool {
        let Some(interaction) = self.interaction else {
            return false;
        };
        if let Some(client) = self.clients.get_mut(interaction.client) {
            client.float_geometry = interaction.start;
            client.geometry = interaction.start;
        }
        tracing::debug!(kind = ?interaction.kind, "interaction cancelled");
        self.finish_interaction().is_some()
    }

    fn finish_interaction(&mut self) -> Option<ClientId> {
        let interaction = self.interaction.take()?;
        let id = interaction.client;
        let family = self.family(id);
        for &member in &family {
            self.placement.insert(member, WorkspaceRef::User(interaction.origin));
        }
        if let Some(ws) = self.workspace_mut(interaction.origin) {
            ws.add_family(&family);
        }
        self.record(ChangeRecord::WorkspaceMove {
            id,
            from: None,
            to: Some(interaction.origin),
        });
        Some(id)
    }
}
