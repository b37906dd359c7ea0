//! Navigation helpers: marks, process jumps, toggle-back and client
//! activation.

use super::{Registry, ToggleAction};
use crate::wm::client::ClientId;
use crate::wm::cycle::Direction;

impl Registry {
    /// Brings a client on screen and focuses it, switching context and
    /// workspace and restoring it from the icon cycle as needed.
    pub fn activate_client(&mut self, id: ClientId, ignore_unwind: bool) -> bool {
        let Some(client) = self.clients.get(id) else {
            tracing::debug!("activate: unknown client");
            return false;
        };
        if client.flags.iconified {
            self.set_iconified(id, ToggleAction::Remove);
        }
        let Some(ws) = self.client_user_workspace(id) else {
            return false;
        };
        if ws.context != self.active_context {
            self.change_active_context(ws.context);
        }
        // Sticky clients are already on whichever workspace is shown
        let sticky = self.is_sticky(id);
        if !sticky && self.visible_workspace_id() != ws {
            self.change_active_workspace(ws.index, false);
        }
        self.focus(id, ignore_unwind)
    }

    // ========================================================================
    // Marks
    // ========================================================================

    /// Remembers the focused client in the active context.
    pub fn mark(&mut self) -> bool {
        let focused = self.focused;
        let Some(context) = self.active_context_mut() else {
            return false;
        };
        context.marked = focused;
        focused.is_some()
    }

    /// Jumps to the marked client. Jumping while it already has focus goes
    /// back to where the last jump started.
    pub fn jump_marked(&mut self) -> bool {
        let focused = self.focused;
        let Some(context) = self.active_context_mut() else {
            return false;
        };
        let Some(marked) = context.marked else {
            tracing::debug!("jump_marked: nothing marked");
            return false;
        };

        if focused == Some(marked) {
            let Some(back) = context.jumped_from.take() else {
                return false;
            };
            context.jumped_from = Some(marked);
            return self.activate_client(back, false);
        }
        context.jumped_from = focused;
        self.activate_client(marked, false)
    }

    /// Cycles through the clients of a process (matched on class or
    /// instance), most recently used first.
    ///
    /// The MRU order is frozen while cycling so repeated jumps visit every
    /// match instead of bouncing between the last two.
    pub fn jump_process(&mut self, name: &str) -> bool {
        let mut candidates: Vec<ClientId> = self
            .mru
            .iter()
            .copied()
            .filter(|&id| self.clients.get(id).is_some_and(|c| c.matches_process(name)))
            .collect();
        for (id, client) in &self.clients {
            if client.matches_process(name) && !candidates.contains(&id) {
                candidates.push(id);
            }
        }
        if candidates.is_empty() {
            tracing::debug!(name, "jump_process: no matching client");
            return false;
        }

        let next = self
            .focused
            .and_then(|focused| candidates.iter().position(|&id| id == focused))
            .map_or(0, |index| (index + 1) % candidates.len());
        self.activate_client(candidates[next], true)
    }

    // ========================================================================
    // Workspace navigation
    // ========================================================================

    /// Shows the neighbouring workspace, wrapping around.
    pub fn step_workspace(&mut self, direction: Direction) -> bool {
        let Some(current) = self.active_context().map(|ctx| ctx.activated) else {
            return false;
        };
        let count = self.workspace_count;
        let next = match direction {
            Direction::Forward => (current + 1) % count,
            Direction::Backward => (current + count - 1) % count,
        };
        self.change_active_workspace(next, true)
    }

    /// Goes back to the previously shown workspace of the active context.
    pub fn toggle_workspace(&mut self) -> bool {
        let Some(previous) = self.active_context().and_then(|ctx| ctx.previous) else {
            return false;
        };
        self.change_active_workspace(previous, false)
    }

    /// Goes back to the previously active context.
    pub fn toggle_context(&mut self) -> bool {
        let Some(previous) = self.previous_context else {
            return false;
        };
        self.change_active_context(previous)
    }

    /// Restores the most recently iconified client of the shown workspace.
    pub fn deiconify_last(&mut self) -> bool {
        let Some(last) = self.active_workspace().and_then(|ws| ws.icons.as_slice().last().copied())
        else {
            return false;
        };
        self.set_iconified(last, ToggleAction::Remove) && self.focus(last, false)
    }
}
