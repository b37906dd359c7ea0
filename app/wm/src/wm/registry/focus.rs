//! Focus bookkeeping.

use super::Registry;
use crate::wm::client::ClientId;
use crate::wm::ledger::ChangeRecord;

impl Registry {
    /// Focuses a client on the shown workspace.
    ///
    /// Does nothing unless the client's top-level ancestor is in the active
    /// workspace and the client itself is live there. With `ignore_unwind`
    /// the most-recently-used order is left alone, so repeated process jumps
    /// keep cycling instead of bouncing between two clients.
    ///
    /// # Returns
    ///
    /// Whether the client holds focus afterwards.
    pub fn focus(&mut self, id: ClientId, ignore_unwind: bool) -> bool {
        let top = self.top_level(id);
        let family = self.family(top);
        let Some(ws) = self.active_workspace_mut() else {
            return false;
        };
        if !ws.live.contains(top) || !ws.live.contains(id) {
            tracing::trace!("focus: client is not live on the active workspace");
            return false;
        }

        ws.note_focus(id);
        ws.raise_family(&family);
        if !ignore_unwind {
            self.mru.retain(|&c| c != id);
            self.mru.insert(0, id);
        } else if !self.mru.contains(&id) {
            self.mru.push(id);
        }

        if self.focused == Some(id) {
            return true;
        }
        let from = self.focused.replace(id);
        self.record(ChangeRecord::Focus { from, to: Some(id) });
        true
    }

    /// Clears focus.
    pub fn unfocus(&mut self) -> bool {
        let Some(from) = self.focused.take() else {
            return false;
        };
        self.record(ChangeRecord::Focus { from: Some(from), to: None });
        true
    }

    /// Clears focus if `id` holds it.
    pub fn unfocus_if_focused(&mut self, id: ClientId) -> bool {
        self.focused == Some(id) && self.unfocus()
    }

    /// Focuses the cursor of the shown workspace, or its first focusable
    /// live client when the cursor was never set. Clears focus when nothing
    /// there can take it.
    pub(super) fn refocus_active(&mut self) {
        let candidates: Vec<ClientId> = self
            .active_workspace()
            .map(|ws| ws.focused().into_iter().chain(ws.live.iter()).collect())
            .unwrap_or_default();
        if !candidates.into_iter().any(|id| self.focus(id, false)) {
            self.unfocus();
        }
    }
}
