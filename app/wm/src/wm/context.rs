//! Contexts: lettered banks of workspaces.

use super::client::ClientId;
use super::workspace::{LayoutParams, UserWorkspace, UserWorkspaceId};

/// Maximum number of contexts, one per letter.
pub const MAX_CONTEXTS: usize = 26;

/// Letter naming the context at `index` (`a` for 0).
#[allow(clippy::cast_possible_truncation)] // index < 26
#[must_use]
pub const fn context_letter(index: usize) -> char {
    if index < MAX_CONTEXTS { (b'a' + index as u8) as char } else { '?' }
}

/// Index of the context named by `letter`, case-insensitive.
#[must_use]
pub const fn context_index(letter: char) -> Option<usize> {
    let lower = letter.to_ascii_lowercase();
    if lower.is_ascii_lowercase() { Some(lower as usize - 'a' as usize) } else { None }
}

/// A bank of workspaces. Exactly one context is active at a time.
#[derive(Debug, Clone)]
pub struct Context {
    pub index: usize,
    workspaces: Vec<UserWorkspace>,
    /// Currently shown workspace.
    pub activated: usize,
    /// Workspace shown before the current one, for toggle-back.
    pub previous: Option<usize>,
    /// Client remembered by `mark`.
    pub marked: Option<ClientId>,
    /// Client focused before the last jump, for jumping back.
    pub jumped_from: Option<ClientId>,
    sticky_count: usize,
}

impl Context {
    /// Creates a context with `count` empty workspaces.
    #[must_use]
    pub fn new(index: usize, count: usize, defaults: LayoutParams) -> Self {
        let workspaces = (0..count.max(1))
            .map(|ws| UserWorkspace::new(UserWorkspaceId::new(index, ws), defaults))
            .collect();
        Self {
            index,
            workspaces,
            activated: 0,
            previous: None,
            marked: None,
            jumped_from: None,
            sticky_count: 0,
        }
    }

    #[must_use]
    pub const fn letter(&self) -> char { context_letter(self.index) }

    #[must_use]
    pub fn workspace(&self, index: usize) -> Option<&UserWorkspace> { self.workspaces.get(index) }

    pub fn workspace_mut(&mut self, index: usize) -> Option<&mut UserWorkspace> {
        self.workspaces.get_mut(index)
    }

    #[must_use]
    pub fn workspaces(&self) -> &[UserWorkspace] { &self.workspaces }

    pub fn workspaces_mut(&mut self) -> &mut [UserWorkspace] { &mut self.workspaces }

    #[must_use]
    pub fn workspace_count(&self) -> usize { self.workspaces.len() }

    /// The currently shown workspace.
    #[must_use]
    pub fn active_workspace(&self) -> &UserWorkspace { &self.workspaces[self.activated] }

    pub fn active_workspace_mut(&mut self) -> &mut UserWorkspace {
        &mut self.workspaces[self.activated]
    }

    #[must_use]
    pub const fn active_id(&self) -> UserWorkspaceId {
        UserWorkspaceId::new(self.index, self.activated)
    }

    // ------------------------------------------------------------------------
    // Sticky bookkeeping
    // ------------------------------------------------------------------------

    #[must_use]
    pub const fn sticky_count(&self) -> usize { self.sticky_count }

    /// Counts `n` more sticky clients (a whole family at once).
    pub const fn record_sticky(&mut self, n: usize) { self.sticky_count += n; }

    /// Counts `n` fewer sticky clients.
    pub const fn erase_sticky(&mut self, n: usize) {
        self.sticky_count = self.sticky_count.saturating_sub(n);
    }

    /// Forgets a client in the mark/jump slots.
    pub fn forget(&mut self, client: ClientId) {
        if self.marked == Some(client) {
            self.marked = None;
        }
        if self.jumped_from == Some(client) {
            self.jumped_from = None;
        }
    }
}
