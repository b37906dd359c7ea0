//! Flag toggles.
//!
//! Every flag follows the same shape: `Toggle` resolves to `Add` or `Remove`
//! from the current state, the guarded transition snapshots what it needs
//! to undo, flips the flag and records the change. Stacking is re-applied by
//! the consumer when it handles the record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Membership, Registry};
use crate::wm::client::ClientId;
use crate::wm::ledger::{ChangeRecord, FlagSnapshot};
use crate::wm::workspace::WorkspaceRef;

/// Requested change of a boolean flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ToggleAction {
    Add,
    Remove,
    Toggle,
}

impl ToggleAction {
    /// Resolves `Toggle` against the current flag value.
    #[must_use]
    pub const fn resolve(self, current: bool) -> Self {
        match self {
            Self::Toggle if current => Self::Remove,
            Self::Toggle => Self::Add,
            other => other,
        }
    }
}

impl Registry {
    // ========================================================================
    // Fullscreen
    // ========================================================================

    pub fn set_fullscreen(&mut self, id: ClientId, action: ToggleAction) -> bool {
        let Some(client) = self.clients.get_mut(id) else {
            tracing::debug!("set_fullscreen: unknown client");
            return false;
        };
        match action.resolve(client.flags.fullscreen) {
            ToggleAction::Add => {
                if client.flags.fullscreen
                    || (client.flags.disowned && !client.flags.in_window_fullscreen)
                {
                    return false;
                }
                let snapshot = FlagSnapshot::of(client);
                client.flags.fullscreen = true;
                if client.is_out_of_window_fullscreen() {
                    client.geometry = self.screen;
                }
                self.snapshots.fullscreen.insert(id, snapshot);
                self.record(ChangeRecord::Fullscreen { id, enabled: true, snapshot });
            }
            ToggleAction::Remove | ToggleAction::Toggle => {
                if !client.flags.fullscreen {
                    return false;
                }
                let snapshot =
                    self.snapshots.fullscreen.remove(id).unwrap_or_else(|| FlagSnapshot::of(client));
                client.flags.fullscreen = false;
                client.geometry = snapshot.geometry;
                client.float_geometry = snapshot.float_geometry;
                self.record(ChangeRecord::Fullscreen { id, enabled: false, snapshot });
            }
        }
        true
    }

    // ========================================================================
    // Above / below
    // ========================================================================

    /// Adding `above` clears `below` without restoring what `below` saved.
    pub fn set_above(&mut self, id: ClientId, action: ToggleAction) -> bool {
        let Some(client) = self.clients.get_mut(id) else {
            tracing::debug!("set_above: unknown client");
            return false;
        };
        match action.resolve(client.flags.above) {
            ToggleAction::Add => {
                if client.flags.above {
                    return false;
                }
                if client.flags.below {
                    client.flags.below = false;
                    self.snapshots.below.remove(id);
                }
                let snapshot = FlagSnapshot::of(client);
                client.flags.above = true;
                client.flags.floating = true;
                self.snapshots.above.insert(id, snapshot);
                self.record(ChangeRecord::Above { id, enabled: true, snapshot });
            }
            ToggleAction::Remove | ToggleAction::Toggle => {
                if !client.flags.above {
                    return false;
                }
                let snapshot =
                    self.snapshots.above.remove(id).unwrap_or_else(|| FlagSnapshot::of(client));
                client.flags.above = false;
                client.flags.floating = snapshot.flags.floating;
                client.geometry = snapshot.geometry;
                client.float_geometry = snapshot.float_geometry;
                self.record(ChangeRecord::Above { id, enabled: false, snapshot });
            }
        }
        true
    }

    /// Adding `below` clears `above` without restoring what `above` saved.
    pub fn set_below(&mut self, id: ClientId, action: ToggleAction) -> bool {
        let Some(client) = self.clients.get_mut(id) else {
            tracing::debug!("set_below: unknown client");
            return false;
        };
        match action.resolve(client.flags.below) {
            ToggleAction::Add => {
                if client.flags.below {
                    return false;
                }
                if client.flags.above {
                    client.flags.above = false;
                    self.snapshots.above.remove(id);
                }
                let snapshot = FlagSnapshot::of(client);
                client.flags.below = true;
                client.flags.floating = true;
                self.snapshots.below.insert(id, snapshot);
                self.record(ChangeRecord::Below { id, enabled: true, snapshot });
            }
            ToggleAction::Remove | ToggleAction::Toggle => {
                if !client.flags.below {
                    return false;
                }
                let snapshot =
                    self.snapshots.below.remove(id).unwrap_or_else(|| FlagSnapshot::of(client));
                client.flags.below = false;
                client.flags.floating = snapshot.flags.floating;
                client.geometry = snapshot.geometry;
                client.float_geometry = snapshot.float_geometry;
                self.record(ChangeRecord::Below { id, enabled: false, snapshot });
            }
        }
        true
    }

    // ========================================================================
    // Urgent
    // ========================================================================

    pub fn set_urgent(&mut self, id: ClientId, action: ToggleAction) -> bool {
        let Some(current) = self.clients.get(id).map(|client| client.flags.urgent) else {
            tracing::debug!("set_urgent: unknown client");
            return false;
        };
        let enabled = match action.resolve(current) {
            ToggleAction::Add if !current => true,
            ToggleAction::Remove if current => false,
            _ => return false,
        };
        if let Some(client) = self.clients.get_mut(id) {
            client.flags.urgent = enabled;
        }
        if let Some(ws) = self.placed_workspace(id)
            && let Some(ws) = self.workspace_mut(ws)
        {
            ws.urgent_count = if enabled {
                ws.urgent_count + 1
            } else {
                ws.urgent_count.saturating_sub(1)
            };
        }
        self.record(ChangeRecord::Urgent { id, enabled });
        true
    }

    // ========================================================================
    // Iconify
    // ========================================================================

    /// Moves the client's family between the live and icon cycles of every
    /// workspace it belongs to.
    pub fn set_iconified(&mut self, id: ClientId, action: ToggleAction) -> bool {
        let Some(client) = self.clients.get(id) else {
            tracing::debug!("set_iconified: unknown client");
            return false;
        };
        let (current, disowned) = (client.flags.iconified, client.flags.disowned);
        let enabled = match action.resolve(current) {
            ToggleAction::Add if !current && !disowned => true,
            ToggleAction::Remove if current => false,
            _ => return false,
        };
        if !matches!(self.placement.get(id), Some(WorkspaceRef::User(_))) {
            tracing::debug!("set_iconified: client is being moved or resized");
            return false;
        }

        let family = self.family(id);
        let (from, to) = if enabled {
            (Membership::Live, Membership::Icon)
        } else {
            (Membership::Icon, Membership::Live)
        };
        if !self.swap_membership(id, &family, from, to) {
            return false;
        }
        for &member in &family {
            if let Some(client) = self.clients.get_mut(member) {
                client.flags.iconified = enabled;
            }
        }
        self.record(ChangeRecord::Iconify { id, enabled });

        if enabled && self.focused.is_some_and(|focused| family.contains(&focused)) {
            self.refocus_active();
        }
        true
    }

    /// Moves a family from one cycle to another in every member workspace.
    fn swap_membership(
        &mut self,
        id: ClientId,
        family: &[ClientId],
        from: Membership,
        to: Membership,
    ) -> bool {
        let workspaces = self.member_workspaces(id);
        let mut moved = false;
        for ws in workspaces {
            let Some(ws) = self.workspace_mut(ws) else {
                continue;
            };
            if Membership::of(ws, id) != Some(from) {
                continue;
            }
            ws.remove_family(family);
            to.add_to(ws, family);
            moved = true;
        }
        moved
    }

    // ========================================================================
    // Disown
    // ========================================================================

    /// Withdraws a client's family from tiling without unmanaging it.
    ///
    /// An out-of-window fullscreen client leaves fullscreen first.
    pub fn set_disowned(&mut self, id: ClientId, action: ToggleAction) -> bool {
        let Some(client) = self.clients.get(id) else {
            tracing::debug!("set_disowned: unknown client");
            return false;
        };
        let (current, iconified) = (client.flags.disowned, client.flags.iconified);
        let out_of_window = client.is_out_of_window_fullscreen();
        let enabled = match action.resolve(current) {
            ToggleAction::Add if !current && !iconified => true,
            ToggleAction::Remove if current => false,
            _ => return false,
        };
        if !matches!(self.placement.get(id), Some(WorkspaceRef::User(_))) {
            tracing::debug!("set_disowned: client is being moved or resized");
            return false;
        }

        if enabled && out_of_window {
            self.set_fullscreen(id, ToggleAction::Remove);
        }
        let family = self.family(id);
        let (from, to) = if enabled {
            (Membership::Live, Membership::Disowned)
        } else {
            (Membership::Disowned, Membership::Live)
        };
        if !self.swap_membership(id, &family, from, to) {
            return false;
        }

        let snapshot = if enabled {
            let Some(client) = self.clients.get(id) else {
                return false;
            };
            let snapshot = FlagSnapshot::of(client);
            self.snapshots.disowned.insert(id, snapshot);
            snapshot
        } else {
            let taken = self.snapshots.disowned.remove(id);
            let Some(client) = self.clients.get_mut(id) else {
                return false;
            };
            let snapshot = taken.unwrap_or_else(|| FlagSnapshot::of(client));
            client.geometry = snapshot.geometry;
            client.float_geometry = snapshot.float_geometry;
            snapshot
        };
        for &member in &family {
            if let Some(client) = self.clients.get_mut(member) {
                client.flags.disowned = enabled;
            }
        }
        self.record(ChangeRecord::Disown { id, enabled, snapshot });

        if enabled && self.focused.is_some_and(|focused| family.contains(&focused)) {
            self.refocus_active();
        }
        true
    }

    // ========================================================================
    // Sticky
    // ========================================================================

    /// Replicates a top-level client's family across every workspace of its
    /// context, or collapses it back into one workspace.
    ///
    /// When un-sticking, the family stays on the shown workspace if its
    /// context is active, otherwise on the workspace it was placed in.
    pub fn set_sticky(&mut self, id: ClientId, action: ToggleAction) -> bool {
        let Some(client) = self.clients.get(id) else {
            tracing::debug!("set_sticky: unknown client");
            return false;
        };
        let current = client.flags.sticky;
        let enabled = match action.resolve(current) {
            ToggleAction::Add if !current && client.parent.is_none() => true,
            ToggleAction::Remove if current => false,
            _ => return false,
        };
        let Some(WorkspaceRef::User(placed)) = self.placement.get(id).copied() else {
            tracing::debug!("set_sticky: client is being moved or resized");
            return false;
        };
        let family = self.family(id);
        let urgent = family
            .iter()
            .filter(|&&member| self.clients.get(member).is_some_and(|c| c.flags.urgent))
            .count();

        if enabled {
            let Some(membership) = self.workspace(placed).and_then(|ws| Membership::of(ws, id)) else {
                return false;
            };
            let Some(context) = self.context_mut(placed.context) else {
                return false;
            };
            for ws in context.workspaces_mut() {
                if ws.id != placed {
                    membership.add_to(ws, &family);
                }
            }
            context.record_sticky(family.len());
        } else {
            let active_context = self.active_context;
            let Some(context) = self.context_mut(placed.context) else {
                return false;
            };
            let keep = if placed.context == active_context {
                context.active_id()
            } else {
                placed
            };
            for ws in context.workspaces_mut() {
                if ws.id != keep {
                    ws.remove_family(&family);
                }
            }
            context.erase_sticky(family.len());
            for &member in &family {
                self.placement.insert(member, WorkspaceRef::User(keep));
            }
            if keep != placed && urgent > 0 {
                if let Some(ws) = self.workspace_mut(placed) {
                    ws.urgent_count = ws.urgent_count.saturating_sub(urgent);
                }
                if let Some(ws) = self.workspace_mut(keep) {
                    ws.urgent_count += urgent;
                }
            }
        }

        for &member in &family {
            if let Some(client) = self.clients.get_mut(member) {
                client.flags.sticky = enabled;
            }
        }
        self.record(ChangeRecord::Sticky { id, enabled });
        true
    }
}
