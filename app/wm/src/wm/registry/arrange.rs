//! Layout operations on the shown workspace, plus the geometry and stacking
//! computation the consumer applies.

use smallvec::SmallVec;

use super::Registry;
use crate::wm::client::ClientId;
use crate::wm::cycle::Direction;
use crate::wm::geometry::{Rect, WindowId};
use crate::wm::layout::{LayoutMode, LayoutRequest, calculate_layout};
use crate::wm::ledger::ChangeRecord;
use crate::wm::stack::{Bucket, StackMember};
use crate::wm::workspace::{UserWorkspace, UserWorkspaceId};

impl Registry {
    // ========================================================================
    // Layout parameters
    // ========================================================================

    /// Runs `op` on the shown workspace and records an arrange when it
    /// reports a change.
    fn adjust_layout(&mut self, op: impl FnOnce(&mut UserWorkspace) -> bool) -> bool {
        let Some(ws) = self.active_workspace_mut() else {
            return false;
        };
        let sidebar = ws.layout.sidebar;
        if !op(ws) {
            return false;
        }
        let (workspace, sidebar_changed) = (ws.id, ws.layout.sidebar != sidebar);
        tracing::debug!(workspace = %workspace, layout = ?ws.layout, "layout changed");
        self.record(ChangeRecord::Arrange { workspace, sidebar_changed });
        true
    }

    pub fn set_layout(&mut self, mode: LayoutMode) -> bool {
        self.adjust_layout(|ws| ws.set_layout(mode))
    }

    pub fn toggle_layout(&mut self) -> bool { self.adjust_layout(UserWorkspace::toggle_layout) }

    pub fn adjust_nmaster(&mut self, delta: i32) -> bool {
        self.adjust_layout(|ws| ws.adjust_nmaster(delta))
    }

    pub fn adjust_mfactor(&mut self, delta: f64) -> bool {
        self.adjust_layout(|ws| ws.adjust_mfactor(delta))
    }

    pub fn adjust_gap(&mut self, delta: i32) -> bool {
        self.adjust_layout(|ws| ws.adjust_gap(delta))
    }

    pub fn toggle_mirror(&mut self) -> bool {
        self.adjust_layout(|ws| {
            ws.toggle_mirror();
            true
        })
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.adjust_layout(|ws| {
            ws.toggle_sidebar();
            true
        })
    }

    /// Restores the shown workspace's layout defaults.
    pub fn reset_layout(&mut self) -> bool {
        self.adjust_layout(|ws| {
            ws.reset();
            true
        })
    }

    // ========================================================================
    // Order
    // ========================================================================

    pub fn rotate_master(&mut self, direction: Direction) -> bool {
        self.adjust_layout(|ws| ws.rotate_master(direction))
    }

    pub fn rotate_stack(&mut self, direction: Direction) -> bool {
        self.adjust_layout(|ws| ws.rotate_stack(direction))
    }

    pub fn rotate_clients(&mut self, direction: Direction) -> bool {
        self.adjust_layout(|ws| ws.rotate_clients(direction))
    }

    /// Swaps the focused client with its neighbour.
    pub fn swap(&mut self, direction: Direction) -> bool {
        self.adjust_layout(|ws| ws.live.swap_move(direction))
    }

    /// Promotes the focused client to the head. Under the floating layout the
    /// two swapped clients also exchange their floating geometry.
    pub fn zoom(&mut self) -> bool {
        let Some(ws) = self.active_workspace_mut() else {
            return false;
        };
        let floating = ws.layout.mode == LayoutMode::Floating;
        let workspace = ws.id;
        let Some((promoted, demoted)) = ws.zoom() else {
            return false;
        };

        if floating
            && let Some([a, b]) = self.clients.get_disjoint_mut([promoted, demoted])
        {
            std::mem::swap(&mut a.float_geometry, &mut b.float_geometry);
            a.geometry = a.float_geometry;
            b.geometry = b.float_geometry;
        }
        self.record(ChangeRecord::Arrange { workspace, sidebar_changed: false });
        self.focus(promoted, false);
        true
    }

    // ========================================================================
    // Focus movement
    // ========================================================================

    /// Focuses the next or previous live client, wrapping around.
    pub fn focus_step(&mut self, direction: Direction) -> bool {
        let Some(target) = self.active_workspace_mut().and_then(|ws| ws.live.rotate(direction)) else {
            return false;
        };
        self.focus(target, false)
    }

    /// Focuses the live client at `index` (zero-based).
    pub fn focus_index(&mut self, index: usize) -> bool {
        let Some(target) = self.active_workspace().and_then(|ws| ws.live.get(index)) else {
            return false;
        };
        self.focus(target, false)
    }

    /// Alternates focus between the master and stack panes.
    pub fn jump_pane(&mut self) -> bool {
        let Some(target) = self.active_workspace_mut().and_then(UserWorkspace::jump_pane) else {
            return false;
        };
        self.focus(target, false)
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Area available to tiling on a workspace: the screen minus the sidebar
    /// strip when the sidebar is shown.
    #[must_use]
    pub fn work_area(&self, id: UserWorkspaceId) -> Rect {
        let sidebar = self.workspace(id).is_some_and(|ws| ws.layout.sidebar);
        if !sidebar {
            return self.screen;
        }
        let width = self.sidebar_width.min(self.screen.width.saturating_sub(1)).max(0);
        Rect::new(self.screen.x + width, self.screen.y, self.screen.width - width, self.screen.height)
    }

    /// Computes and stores the geometry of every visible member of a
    /// workspace.
    ///
    /// Tileable clients go through the workspace's layout; floating clients
    /// and transients keep their floating geometry; out-of-window fullscreen
    /// clients cover the screen. Iconified clients are skipped.
    ///
    /// # Returns
    ///
    /// `(frame, geometry)` pairs in tiling order.
    pub fn arrange(&mut self, id: UserWorkspaceId) -> Vec<(WindowId, Rect)> {
        let area = self.work_area(id);
        let Some(ws) = self.workspace(id) else {
            return Vec::new();
        };
        let layout = ws.layout;
        let members: Vec<ClientId> = ws.live.iter().chain(ws.disowned.iter()).collect();

        let tiled: SmallVec<[WindowId; 16]> = if layout.mode.is_tiling() {
            ws.live
                .iter()
                .filter_map(|member| self.clients.get(member))
                .filter(|client| client.is_tileable())
                .map(|client| client.frame)
                .collect()
        } else {
            SmallVec::new()
        };
        let request = LayoutRequest::new(layout.mode, area)
            .with_gap(layout.gap)
            .with_nmaster(layout.nmaster)
            .with_mfactor(layout.mfactor)
            .with_mirror(layout.mirror);
        let cells = calculate_layout(&tiled, &request);

        let screen = self.screen;
        let mut placed = Vec::with_capacity(members.len());
        for member in members {
            let Some(client) = self.clients.get_mut(member) else {
                continue;
            };
            let geometry = if client.is_out_of_window_fullscreen() {
                screen
            } else if let Some(&(_, cell)) = cells.iter().find(|(frame, _)| *frame == client.frame) {
                cell
            } else {
                client.float_geometry
            };
            client.geometry = geometry;
            placed.push((client.frame, geometry));
        }
        placed
    }

    /// Buckets the members of a workspace for restacking, front first.
    ///
    /// A client being dragged out of this workspace is put in front as an
    /// above client.
    #[must_use]
    pub fn stack_members(&self, id: UserWorkspaceId) -> Vec<StackMember> {
        let Some(ws) = self.workspace(id) else {
            return Vec::new();
        };
        let ignore_floating = ws.layout.mode.ignores_floating();
        let mut members = Vec::with_capacity(ws.stacking().len() + 1);

        if let Some(interaction) = self.interaction.as_ref().filter(|i| i.origin == id) {
            for member in self.family(interaction.client) {
                if let Some(client) = self.clients.get(member) {
                    members.push(StackMember { window: client.frame, bucket: Bucket::Above });
                }
            }
        }

        for &member in ws.stacking() {
            if ws.icons.contains(member) {
                continue;
            }
            let Some(client) = self.clients.get(member) else {
                continue;
            };
            let bucket = if client.flags.disowned {
                Bucket::Disowned
            } else if client.is_out_of_window_fullscreen() {
                Bucket::Fullscreen
            } else if client.flags.above {
                Bucket::Above
            } else if client.flags.below {
                Bucket::Below
            } else if (client.flags.floating || client.parent.is_some()) && !ignore_floating {
                Bucket::Floating
            } else {
                Bucket::Normal
            };
            members.push(StackMember { window: client.frame, bucket });
        }
        members
    }

    /// Full front-to-back order for the shown workspace.
    #[must_use]
    pub fn stacking_order(&self) -> Vec<WindowId> {
        self.stack.compose(&self.stack_members(self.visible_workspace_id()))
    }

    /// Clients whose windows belong on screen for a workspace: live and
    /// disowned members, plus a client dragged out of it.
    #[must_use]
    pub fn shown_clients(&self, id: UserWorkspaceId) -> Vec<ClientId> {
        let Some(ws) = self.workspace(id) else {
            return Vec::new();
        };
        let mut shown: Vec<ClientId> = ws.live.iter().chain(ws.disowned.iter()).collect();
        if let Some(interaction) = self.interaction.as_ref().filter(|i| i.origin == id) {
            shown.extend(self.family(interaction.client));
        }
        shown
    }
}
