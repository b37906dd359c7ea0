//! User workspaces and the move/resize pseudo-workspaces.

use serde::{Deserialize, Serialize};

use super::client::ClientId;
use super::cycle::{Direction, FocusCycle};
use super::layout::LayoutMode;
use crate::config::LayoutConfig;

// ============================================================================
// Identifiers
// ============================================================================

/// Address of a user workspace: context index plus workspace index, both
/// zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserWorkspaceId {
    pub context: usize,
    pub index: usize,
}

impl UserWorkspaceId {
    #[must_use]
    pub const fn new(context: usize, index: usize) -> Self { Self { context, index } }
}

impl std::fmt::Display for UserWorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", super::context::context_letter(self.context), self.index + 1)
    }
}

/// Where a client currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceRef {
    User(UserWorkspaceId),
    /// Pseudo-workspace holding a client being dragged.
    Move,
    /// Pseudo-workspace holding a client being resized.
    Resize,
}

impl WorkspaceRef {
    /// The user workspace, or `None` for the pseudo-workspaces.
    #[must_use]
    pub const fn user(self) -> Option<UserWorkspaceId> {
        match self {
            Self::User(id) => Some(id),
            Self::Move | Self::Resize => None,
        }
    }
}

// ============================================================================
// Layout Parameters
// ============================================================================

/// Layout state of one workspace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub mode: LayoutMode,
    /// Mode restored by `toggle_layout`.
    pub previous_mode: LayoutMode,
    pub nmaster: usize,
    pub gap: i32,
    pub mfactor: f64,
    pub mirror: bool,
    pub sidebar: bool,
}

impl From<&LayoutConfig> for LayoutParams {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            mode: config.mode,
            previous_mode: config.mode,
            nmaster: config.nmaster,
            gap: config.gap,
            mfactor: config.mfactor,
            mirror: config.mirror,
            sidebar: config.sidebar,
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self { Self::from(&LayoutConfig::default()) }
}

/// Lower bound of the master fraction.
pub const MFACTOR_MIN: f64 = 0.05;
/// Upper bound of the master fraction.
pub const MFACTOR_MAX: f64 = 0.95;

// ============================================================================
// User Workspace
// ============================================================================

/// Zone of the master/stack split a client sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Master,
    Stack,
}

/// One tileable desktop.
#[derive(Debug, Clone)]
pub struct UserWorkspace {
    pub id: UserWorkspaceId,
    /// Mapped clients, in tiling order.
    pub live: FocusCycle<ClientId>,
    /// Iconified clients, most recent last.
    pub icons: FocusCycle<ClientId>,
    /// Clients withdrawn from tiling.
    pub disowned: FocusCycle<ClientId>,
    /// Workspace-local stacking order, front first.
    stacking: Vec<ClientId>,
    pub layout: LayoutParams,
    defaults: LayoutParams,
    pub urgent_count: usize,
    last_master: Option<ClientId>,
    last_stack: Option<ClientId>,
}

impl UserWorkspace {
    /// Creates an empty workspace with the given layout defaults.
    #[must_use]
    pub fn new(id: UserWorkspaceId, defaults: LayoutParams) -> Self {
        Self {
            id,
            live: FocusCycle::new(),
            icons: FocusCycle::new(),
            disowned: FocusCycle::new(),
            stacking: Vec::new(),
            layout: defaults,
            defaults,
            urgent_count: 0,
            last_master: None,
            last_stack: None,
        }
    }

    /// Whether the client is a member of any of the three cycles.
    #[must_use]
    pub fn contains(&self, client: ClientId) -> bool {
        self.live.contains(client) || self.icons.contains(client) || self.disowned.contains(client)
    }

    /// Number of clients across all three cycles.
    #[must_use]
    pub fn client_count(&self) -> usize { self.live.len() + self.icons.len() + self.disowned.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.client_count() == 0 }

    /// The focused live client.
    #[must_use]
    pub fn focused(&self) -> Option<ClientId> { self.live.current() }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    /// Adds a family (head first, then its transients) to the live cycle and
    /// puts it in front of the stacking order.
    pub fn add_family(&mut self, family: &[ClientId]) {
        for &id in family {
            self.live.push_back(id);
        }
        self.raise_family(family);
    }

    /// Adds a family to the icon cycle.
    pub fn add_icon_family(&mut self, family: &[ClientId]) {
        for &id in family {
            self.icons.push_back(id);
        }
    }

    /// Adds a family to the disowned cycle.
    pub fn add_disowned_family(&mut self, family: &[ClientId]) {
        for &id in family {
            self.disowned.push_back(id);
        }
        self.raise_family(family);
    }

    /// Removes a family from every cycle and from the stacking order.
    pub fn remove_family(&mut self, family: &[ClientId]) {
        for &id in family {
            self.live.remove(id);
            self.icons.remove(id);
            self.disowned.remove(id);
            self.stacking.retain(|&c| c != id);
            if self.last_master == Some(id) {
                self.last_master = None;
            }
            if self.last_stack == Some(id) {
                self.last_stack = None;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Stacking
    // ------------------------------------------------------------------------

    /// Moves a family to the front of the stacking order. Transients end up
    /// in front of their parent.
    pub fn raise_family(&mut self, family: &[ClientId]) {
        self.stacking.retain(|c| !family.contains(c));
        for &id in family {
            self.stacking.insert(0, id);
        }
    }

    /// Stacking order, front first.
    #[must_use]
    pub fn stacking(&self) -> &[ClientId] { &self.stacking }

    // ------------------------------------------------------------------------
    // Focus bookkeeping
    // ------------------------------------------------------------------------

    /// Zone the client occupies, based on its position in the live cycle.
    #[must_use]
    pub fn pane_of(&self, client: ClientId) -> Option<Pane> {
        let index = self.live.index_of(client)?;
        Some(if index < self.layout.nmaster { Pane::Master } else { Pane::Stack })
    }

    /// Sets the focus cursor and remembers the client for its pane.
    pub fn note_focus(&mut self, client: ClientId) -> bool {
        if !self.live.set_current(client) {
            return false;
        }
        match self.pane_of(client) {
            Some(Pane::Master) => self.last_master = Some(client),
            Some(Pane::Stack) => self.last_stack = Some(client),
            None => {}
        }
        true
    }

    /// Target of a pane jump: the last used client of the other pane.
    ///
    /// A remembered client that has since moved to another pane is forgotten
    /// and the first member of the target pane is used instead.
    pub fn jump_pane(&mut self) -> Option<ClientId> {
        let current = self.live.current()?;
        let target_pane = match self.pane_of(current)? {
            Pane::Master => Pane::Stack,
            Pane::Stack => Pane::Master,
        };

        let remembered = match target_pane {
            Pane::Master => self.last_master,
            Pane::Stack => self.last_stack,
        };
        if let Some(client) = remembered
            && self.pane_of(client) == Some(target_pane)
        {
            return Some(client);
        }

        match target_pane {
            Pane::Master => self.last_master = None,
            Pane::Stack => self.last_stack = None,
        }
        let first = match target_pane {
            Pane::Master => 0,
            Pane::Stack => self.layout.nmaster,
        };
        self.live.get(first)
    }

    // ------------------------------------------------------------------------
    // Rotations
    // ------------------------------------------------------------------------

    fn rotation_allowed(&self) -> bool { self.layout.mode != LayoutMode::Monocle }

    /// Rotates the members of the master pane.
    pub fn rotate_master(&mut self, direction: Direction) -> bool {
        let end = self.layout.nmaster.min(self.live.len());
        self.rotation_allowed() && self.live.rotate_range(0, end, direction)
    }

    /// Rotates the members of the stack pane.
    pub fn rotate_stack(&mut self, direction: Direction) -> bool {
        let start = self.layout.nmaster.min(self.live.len());
        self.rotation_allowed() && self.live.rotate_range(start, self.live.len(), direction)
    }

    /// Rotates every live client.
    pub fn rotate_clients(&mut self, direction: Direction) -> bool {
        self.rotation_allowed() && self.live.rotate_range(0, self.live.len(), direction)
    }

    /// Promotes the focused client to the head of the live cycle.
    ///
    /// Returns the swapped pair `(promoted, demoted)`, so the caller can
    /// exchange floating geometry under the floating layout.
    pub fn zoom(&mut self) -> Option<(ClientId, ClientId)> { self.live.zoom() }

    // ------------------------------------------------------------------------
    // Layout parameters
    // ------------------------------------------------------------------------

    /// Switches to a layout mode, remembering the current one.
    pub fn set_layout(&mut self, mode: LayoutMode) -> bool {
        if self.layout.mode == mode {
            return false;
        }
        self.layout.previous_mode = self.layout.mode;
        self.layout.mode = mode;
        true
    }

    /// Swaps back to the previous layout mode.
    pub fn toggle_layout(&mut self) -> bool {
        let previous = self.layout.previous_mode;
        self.set_layout(previous)
    }

    /// Adjusts the master count, never below zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn adjust_nmaster(&mut self, delta: i32) -> bool {
        let next = self.layout.nmaster.saturating_add_signed(delta as isize);
        let changed = next != self.layout.nmaster;
        self.layout.nmaster = next;
        changed
    }

    /// Adjusts the master fraction within its bounds.
    pub fn adjust_mfactor(&mut self, delta: f64) -> bool {
        let next = (self.layout.mfactor + delta).clamp(MFACTOR_MIN, MFACTOR_MAX);
        let changed = (next - self.layout.mfactor).abs() > f64::EPSILON;
        self.layout.mfactor = next;
        changed
    }

    /// Adjusts the gap, never below zero.
    pub fn adjust_gap(&mut self, delta: i32) -> bool {
        let next = (self.layout.gap + delta).max(0);
        let changed = next != self.layout.gap;
        self.layout.gap = next;
        changed
    }

    pub fn toggle_mirror(&mut self) { self.layout.mirror = !self.layout.mirror; }

    pub fn toggle_sidebar(&mut self) { self.layout.sidebar = !self.layout.sidebar; }

    /// Restores every layout parameter to its default.
    ///
    /// # Returns
    ///
    /// Whether the sidebar flag changed.
    pub fn reset(&mut self) -> bool {
        let sidebar_changed = self.layout.sidebar != self.defaults.sidebar;
        self.layout = self.defaults;
        sidebar_changed
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn workspace_with(count: usize) -> (UserWorkspace, Vec<ClientId>) {
        let mut keys: SlotMap<ClientId, ()> = SlotMap::with_key();
        let ids: Vec<ClientId> = (0..count).map(|_| keys.insert(())).collect();
        let mut ws = UserWorkspace::new(UserWorkspaceId::new(0, 0), LayoutParams::default());
        for &id in &ids {
            ws.add_family(&[id]);
        }
        (ws, ids)
    }

    #[test]
    fn test_display_id() {
        assert_eq!(UserWorkspaceId::new(1, 2).to_string(), "b:3");
    }

    #[test]
    fn test_raise_family_puts_children_in_front() {
        let (mut ws, ids) = workspace_with(3);
        ws.raise_family(&[ids[0], ids[2]]);
        assert_eq!(ws.stacking(), &[ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn test_remove_family_clears_every_cycle() {
        let (mut ws, ids) = workspace_with(2);
        ws.add_icon_family(&[ids[0]]);
        ws.remove_family(&[ids[0]]);
        assert!(!ws.contains(ids[0]));
        assert_eq!(ws.stacking(), &[ids[1]]);
    }

    #[test]
    fn test_rotations_disabled_in_monocle() {
        let (mut ws, _) = workspace_with(3);
        ws.set_layout(LayoutMode::Monocle);
        assert!(!ws.rotate_clients(Direction::Forward));
        ws.set_layout(LayoutMode::Tile);
        assert!(ws.rotate_clients(Direction::Forward));
    }

    #[test]
    fn test_rotate_master_needs_two_members() {
        let (mut ws, ids) = workspace_with(3);
        assert!(!ws.rotate_master(Direction::Forward));
        assert!(ws.rotate_stack(Direction::Forward));
        assert_eq!(ws.live.as_slice(), &[ids[0], ids[2], ids[1]]);
    }

    #[test]
    fn test_toggle_layout_swaps_back() {
        let (mut ws, _) = workspace_with(0);
        ws.set_layout(LayoutMode::Grid);
        assert!(ws.toggle_layout());
        assert_eq!(ws.layout.mode, LayoutMode::Tile);
        assert!(ws.toggle_layout());
        assert_eq!(ws.layout.mode, LayoutMode::Grid);
    }

    #[test]
    fn test_parameter_clamps() {
        let (mut ws, _) = workspace_with(0);
        ws.adjust_nmaster(-5);
        assert_eq!(ws.layout.nmaster, 0);
        ws.adjust_mfactor(2.0);
        assert!((ws.layout.mfactor - MFACTOR_MAX).abs() < f64::EPSILON);
        ws.adjust_gap(-100);
        assert_eq!(ws.layout.gap, 0);
    }

    #[test]
    fn test_reset_reports_sidebar_change() {
        let (mut ws, _) = workspace_with(0);
        ws.set_layout(LayoutMode::Monocle);
        assert!(!ws.reset());
        assert_eq!(ws.layout.mode, LayoutMode::Tile);

        ws.toggle_sidebar();
        assert!(ws.reset());
    }

    #[test]
    fn test_jump_pane_alternates() {
        let (mut ws, ids) = workspace_with(3);
        ws.note_focus(ids[2]);
        ws.note_focus(ids[0]);
        assert_eq!(ws.jump_pane(), Some(ids[2]));
        ws.note_focus(ids[2]);
        assert_eq!(ws.jump_pane(), Some(ids[0]));
    }

    #[test]
    fn test_jump_pane_forgets_moved_client() {
        let (mut ws, ids) = workspace_with(3);
        ws.note_focus(ids[2]);
        ws.note_focus(ids[0]);
        // ids[2] becomes the master, ids[0] moves to the stack
        ws.live.set_current(ids[2]);
        ws.zoom();
        ws.note_focus(ids[2]);
        assert_eq!(ws.jump_pane(), Some(ids[1]));
    }
}
