//! The client registry.
//!
//! [`Registry`] is the single authority over managed clients: which window
//! belongs to which client, where every client lives, which one has focus,
//! and the side tables used to undo flag transitions. Every mutating
//! operation updates the model before returning and appends the matching
//! [`ChangeRecord`] to the ledger; nothing here talks to the display.
//!
//! The operations are split by concern:
//!
//! - `manage`: manage / unmanage
//! - `focus`: focus bookkeeping
//! - `flags`: the fullscreen/above/below/urgent/iconify/disown/sticky toggles
//! - `placement`: moving clients between workspaces and contexts, activation
//! - `interaction`: the move/resize lifecycle
//! - `navigation`: marks, process jumps, toggle-back
//! - `arrange`: layout operations and geometry/stacking computation

mod arrange;
mod flags;
mod focus;
mod interaction;
mod manage;
mod navigation;
mod placement;

use std::collections::HashMap;

pub use flags::ToggleAction;
pub use interaction::InteractionKind;
use slotmap::{SecondaryMap, SlotMap};

use super::client::{Client, ClientId};
use super::context::{Context, context_letter};
use super::geometry::{Rect, WindowId};
use super::ledger::{ChangeLedger, ChangeRecord, FlagSnapshot, RecordKind};
use super::rules::RuleSet;
use super::snapshot::{StateSnapshot, WorkspaceSnapshot};
use super::stack::WindowStack;
use super::workspace::{LayoutParams, UserWorkspace, UserWorkspaceId, WorkspaceRef};
use crate::config::Config;
use crate::error::ConfigError;

/// Cycle of a workspace a client is a member of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Live,
    Icon,
    Disowned,
}

impl Membership {
    /// Cycle holding `client` in `workspace`.
    #[must_use]
    pub fn of(workspace: &UserWorkspace, client: ClientId) -> Option<Self> {
        if workspace.live.contains(client) {
            Some(Self::Live)
        } else if workspace.icons.contains(client) {
            Some(Self::Icon)
        } else if workspace.disowned.contains(client) {
            Some(Self::Disowned)
        } else {
            None
        }
    }

    /// Adds a family to the cycle this membership names.
    pub fn add_to(self, workspace: &mut UserWorkspace, family: &[ClientId]) {
        match self {
            Self::Live => workspace.add_family(family),
            Self::Icon => workspace.add_icon_family(family),
            Self::Disowned => workspace.add_disowned_family(family),
        }
    }
}

/// Pre-transition snapshots, one table per undoable flag.
#[derive(Debug, Default)]
struct SnapshotTables {
    fullscreen: SecondaryMap<ClientId, FlagSnapshot>,
    above: SecondaryMap<ClientId, FlagSnapshot>,
    below: SecondaryMap<ClientId, FlagSnapshot>,
    disowned: SecondaryMap<ClientId, FlagSnapshot>,
}

impl SnapshotTables {
    fn forget(&mut self, id: ClientId) {
        self.fullscreen.remove(id);
        self.above.remove(id);
        self.below.remove(id);
        self.disowned.remove(id);
    }

    fn holds(&self, id: ClientId) -> bool {
        self.fullscreen.contains_key(id)
            || self.above.contains_key(id)
            || self.below.contains_key(id)
            || self.disowned.contains_key(id)
    }
}

/// Authoritative model of every managed client.
#[derive(Debug)]
pub struct Registry {
    // Configuration
    context_count: usize,
    workspace_count: usize,
    layout_defaults: LayoutParams,
    sidebar_width: i32,
    focus_follows_mouse: bool,
    rules: RuleSet,
    screen: Rect,

    // Clients and lookups
    clients: SlotMap<ClientId, Client>,
    windows: HashMap<WindowId, ClientId>,
    placement: SecondaryMap<ClientId, WorkspaceRef>,
    home_context: SecondaryMap<ClientId, usize>,

    // Hierarchy
    contexts: Vec<Option<Context>>,
    active_context: usize,
    previous_context: Option<usize>,

    // Focus
    focused: Option<ClientId>,
    /// Most recently used first.
    mru: Vec<ClientId>,

    interaction: Option<interaction::Interaction>,
    snapshots: SnapshotTables,
    ledger: ChangeLedger,
    stack: WindowStack,
    /// Set while consecutive next/previous workspace activations happen.
    /// Shared by every context.
    cycling_workspaces: bool,
}

impl Registry {
    /// Creates an empty registry with context `a` active.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a window rule fails to compile.
    pub fn new(config: &Config, screen: Rect) -> Result<Self, ConfigError> {
        let layout_defaults = LayoutParams::from(&config.layout);
        let mut contexts: Vec<Option<Context>> = (0..config.contexts).map(|_| None).collect();
        if let Some(first) = contexts.first_mut() {
            *first = Some(Context::new(0, config.workspaces, layout_defaults));
        }

        Ok(Self {
            context_count: contexts.len(),
            workspace_count: config.workspaces.max(1),
            layout_defaults,
            sidebar_width: config.layout.sidebar_width,
            focus_follows_mouse: config.focus_follows_mouse,
            rules: RuleSet::compile(&config.rules)?,
            screen,
            clients: SlotMap::with_key(),
            windows: HashMap::new(),
            placement: SecondaryMap::new(),
            home_context: SecondaryMap::new(),
            contexts,
            active_context: 0,
            previous_context: None,
            focused: None,
            mru: Vec::new(),
            interaction: None,
            snapshots: SnapshotTables::default(),
            ledger: ChangeLedger::new(),
            stack: WindowStack::new(),
            cycling_workspaces: false,
        })
    }

    // ========================================================================
    // Configuration accessors
    // ========================================================================

    #[must_use]
    pub const fn screen(&self) -> Rect { self.screen }

    pub const fn set_screen(&mut self, screen: Rect) { self.screen = screen; }

    #[must_use]
    pub const fn rules(&self) -> &RuleSet { &self.rules }

    #[must_use]
    pub const fn focus_follows_mouse(&self) -> bool { self.focus_follows_mouse }

    #[must_use]
    pub const fn context_count(&self) -> usize { self.context_count }

    #[must_use]
    pub const fn workspace_count(&self) -> usize { self.workspace_count }

    /// Desktop number published for a workspace (contexts laid out one after
    /// another).
    #[must_use]
    pub const fn desktop_index(&self, id: UserWorkspaceId) -> usize {
        id.context * self.workspace_count + id.index
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Client owning a frame or content window.
    #[must_use]
    pub fn win_client(&self, window: WindowId) -> Option<ClientId> {
        self.windows.get(&window).copied()
    }

    #[must_use]
    pub fn client(&self, id: ClientId) -> Option<&Client> { self.clients.get(id) }

    pub fn client_mut(&mut self, id: ClientId) -> Option<&mut Client> { self.clients.get_mut(id) }

    pub fn clients(&self) -> impl Iterator<Item = (ClientId, &Client)> { self.clients.iter() }

    #[must_use]
    pub fn client_count(&self) -> usize { self.clients.len() }

    /// Home context of a client.
    #[must_use]
    pub fn client_context(&self, id: ClientId) -> Option<usize> {
        self.home_context.get(id).copied()
    }

    /// Workspace a client currently lives in. Sticky clients report the shown
    /// workspace of their context.
    #[must_use]
    pub fn client_workspace(&self, id: ClientId) -> Option<WorkspaceRef> {
        let placement = *self.placement.get(id)?;
        if let WorkspaceRef::User(_) = placement
            && self.is_sticky(id)
        {
            let context = self.context(self.client_context(id)?)?;
            return Some(WorkspaceRef::User(context.active_id()));
        }
        Some(placement)
    }

    /// User workspace of a client. For a client inside a pseudo-workspace
    /// this is the workspace the interaction started from.
    #[must_use]
    pub fn client_user_workspace(&self, id: ClientId) -> Option<UserWorkspaceId> {
        match self.client_workspace(id)? {
            WorkspaceRef::User(ws) => Some(ws),
            WorkspaceRef::Move | WorkspaceRef::Resize => {
                self.interaction.as_ref().map(|interaction| interaction.origin)
            }
        }
    }

    /// Workspace a client was placed in, ignoring sticky replication. Urgency
    /// is counted there.
    fn placed_workspace(&self, id: ClientId) -> Option<UserWorkspaceId> {
        match self.placement.get(id)? {
            WorkspaceRef::User(ws) => Some(*ws),
            WorkspaceRef::Move | WorkspaceRef::Resize => {
                self.interaction.as_ref().map(|interaction| interaction.origin)
            }
        }
    }

    fn is_sticky(&self, id: ClientId) -> bool {
        self.clients.get(id).is_some_and(|client| client.flags.sticky)
    }

    /// The client followed by all of its transients, head first.
    #[must_use]
    pub fn family(&self, id: ClientId) -> Vec<ClientId> {
        let mut family = Vec::new();
        if !self.clients.contains_key(id) {
            return family;
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            family.push(next);
            if let Some(client) = self.clients.get(next) {
                pending.extend(client.children.iter().rev().copied());
            }
        }
        family
    }

    /// Topmost ancestor of a transient chain.
    #[must_use]
    pub fn top_level(&self, id: ClientId) -> ClientId {
        let mut current = id;
        // The parent graph is a tree, the bound only guards against corruption
        for _ in 0..self.clients.len() {
            match self.clients.get(current).and_then(|client| client.parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Workspaces a client is a member of: every workspace of its context
    /// when sticky, otherwise its own.
    fn member_workspaces(&self, id: ClientId) -> Vec<UserWorkspaceId> {
        let Some(WorkspaceRef::User(ws)) = self.placement.get(id).copied() else {
            return Vec::new();
        };
        if !self.is_sticky(id) {
            return vec![ws];
        }
        (0..self.workspace_count).map(|index| UserWorkspaceId::new(ws.context, index)).collect()
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    #[must_use]
    pub fn context(&self, index: usize) -> Option<&Context> {
        self.contexts.get(index).and_then(Option::as_ref)
    }

    fn context_mut(&mut self, index: usize) -> Option<&mut Context> {
        self.contexts.get_mut(index).and_then(Option::as_mut)
    }

    /// Returns the context, creating it on first use.
    fn ensure_context(&mut self, index: usize) -> Option<&mut Context> {
        let count = self.workspace_count;
        let defaults = self.layout_defaults;
        let slot = self.contexts.get_mut(index)?;
        if slot.is_none() {
            tracing::debug!(context = %context_letter(index), "initializing context");
        }
        Some(slot.get_or_insert_with(|| Context::new(index, count, defaults)))
    }

    #[must_use]
    pub const fn active_context_index(&self) -> usize { self.active_context }

    #[must_use]
    pub fn active_context(&self) -> Option<&Context> { self.context(self.active_context) }

    fn active_context_mut(&mut self) -> Option<&mut Context> {
        self.context_mut(self.active_context)
    }

    /// The workspace currently shown.
    #[must_use]
    pub fn visible_workspace_id(&self) -> UserWorkspaceId {
        self.active_context().map_or(UserWorkspaceId::new(self.active_context, 0), Context::active_id)
    }

    #[must_use]
    pub fn workspace(&self, id: UserWorkspaceId) -> Option<&UserWorkspace> {
        self.context(id.context)?.workspace(id.index)
    }

    fn workspace_mut(&mut self, id: UserWorkspaceId) -> Option<&mut UserWorkspace> {
        self.context_mut(id.context)?.workspace_mut(id.index)
    }

    #[must_use]
    pub fn active_workspace(&self) -> Option<&UserWorkspace> {
        self.active_context().map(Context::active_workspace)
    }

    fn active_workspace_mut(&mut self) -> Option<&mut UserWorkspace> {
        self.active_context_mut().map(Context::active_workspace_mut)
    }

    /// Whether the client's windows should currently be on screen.
    #[must_use]
    pub fn is_visible(&self, id: ClientId) -> bool {
        let Some(client) = self.clients.get(id) else {
            return false;
        };
        if client.flags.iconified {
            return false;
        }
        match self.placement.get(id) {
            Some(WorkspaceRef::Move | WorkspaceRef::Resize) => true,
            Some(WorkspaceRef::User(ws)) if client.flags.sticky => {
                ws.context == self.active_context
            }
            Some(WorkspaceRef::User(ws)) => *ws == self.visible_workspace_id(),
            None => false,
        }
    }

    /// Sticky clients and their home contexts.
    pub fn sticky_clients(&self) -> impl Iterator<Item = (ClientId, usize)> + '_ {
        self.clients
            .iter()
            .filter(|(_, client)| client.flags.sticky)
            .filter_map(|(id, _)| Some((id, self.client_context(id)?)))
    }

    // ========================================================================
    // Focus state
    // ========================================================================

    #[must_use]
    pub const fn focused(&self) -> Option<ClientId> { self.focused }

    /// Most recently used clients, newest first.
    #[must_use]
    pub fn mru(&self) -> &[ClientId] { &self.mru }

    // ========================================================================
    // Ledger and stack
    // ========================================================================

    fn record(&mut self, record: ChangeRecord) { self.ledger.enqueue(record); }

    /// Takes the oldest pending change record.
    pub fn dequeue_change(&mut self) -> Option<ChangeRecord> { self.ledger.dequeue_next() }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool { self.ledger.has_pending() }

    /// Kinds of the pending records, oldest first.
    pub fn pending_changes(&self) -> impl Iterator<Item = RecordKind> + '_ { self.ledger.kinds() }

    /// Discards every pending record.
    pub fn flush_changes(&mut self) -> usize { self.ledger.drain_all() }

    #[must_use]
    pub const fn stack(&self) -> &WindowStack { &self.stack }

    pub const fn stack_mut(&mut self) -> &mut WindowStack { &mut self.stack }

    /// Whether a pre-transition snapshot is still held for the client.
    #[must_use]
    pub fn holds_snapshot(&self, id: ClientId) -> bool { self.snapshots.holds(id) }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Serializable summary of the model.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        let windows = |cycle: &crate::wm::cycle::FocusCycle<ClientId>| -> Vec<WindowId> {
            cycle.iter().filter_map(|id| self.clients.get(id)).map(|client| client.window).collect()
        };
        let visible = self.visible_workspace_id();

        let workspaces = self
            .contexts
            .iter()
            .flatten()
            .flat_map(Context::workspaces)
            .map(|ws| WorkspaceSnapshot {
                name: ws.id.to_string(),
                layout: ws.layout.mode,
                live: windows(&ws.live),
                icons: windows(&ws.icons),
                disowned: windows(&ws.disowned),
            })
            .filter(|ws| !ws.is_empty())
            .collect();

        StateSnapshot {
            context: context_letter(visible.context),
            workspace: visible.index + 1,
            focused: self.focused.and_then(|id| self.clients.get(id)).map(|client| client.window),
            workspaces,
        }
    }

    /// Verifies the membership invariants, describing the first violation.
    ///
    /// # Errors
    ///
    /// Returns a description of the broken invariant.
    pub fn check_consistency(&self) -> Result<(), String> {
        for (id, client) in &self.clients {
            for window in [client.window, client.frame] {
                if self.windows.get(&window) != Some(&id) {
                    return Err(format!("window {window} does not map back to its client"));
                }
            }
            let Some(placement) = self.placement.get(id).copied() else {
                return Err(format!("client {} has no placement", client.window));
            };
            let Some(home) = self.client_context(id) else {
                return Err(format!("client {} has no context", client.window));
            };

            let members: Vec<UserWorkspaceId> = self
                .contexts
                .iter()
                .flatten()
                .flat_map(Context::workspaces)
                .filter(|ws| ws.contains(id))
                .map(|ws| ws.id)
                .collect();
            let expected = match placement {
                WorkspaceRef::User(_) => self.member_workspaces(id),
                WorkspaceRef::Move | WorkspaceRef::Resize => Vec::new(),
            };
            if members != expected {
                return Err(format!(
                    "client {} is in {members:?}, expected {expected:?}",
                    client.window
                ));
            }
            if let WorkspaceRef::User(ws) = placement
                && ws.context != home
            {
                return Err(format!("client {} placed outside its context", client.window));
            }
            for ws in &members {
                let in_cycles = self.workspace(*ws).map_or(0, |w| {
                    usize::from(w.live.contains(id))
                        + usize::from(w.icons.contains(id))
                        + usize::from(w.disowned.contains(id))
                });
                if in_cycles != 1 {
                    return Err(format!("client {} is in {in_cycles} cycles of {ws}", client.window));
                }
            }
        }

        if self.windows.len() != self.clients.len() * 2 {
            return Err(format!(
                "{} window entries for {} clients",
                self.windows.len(),
                self.clients.len()
            ));
        }
        if let Some(focused) = self.focused
            && !self.active_workspace().is_some_and(|ws| ws.live.contains(focused))
        {
            return Err("focused client is not in the active workspace".to_string());
        }
        for context in self.contexts.iter().flatten() {
            let sticky = self
                .sticky_clients()
                .filter(|&(_, home)| home == context.index)
                .count();
            if sticky != context.sticky_count() {
                return Err(format!(
                    "context {} counts {} sticky clients, found {sticky}",
                    context.letter(),
                    context.sticky_count()
                ));
            }
            for ws in context.workspaces() {
                let urgent = self
                    .clients
                    .iter()
                    .filter(|(id, client)| {
                        client.flags.urgent && self.placed_workspace(*id) == Some(ws.id)
                    })
                    .count();
                if urgent != ws.urgent_count {
                    return Err(format!(
                        "workspace {} counts {} urgent clients, found {urgent}",
                        ws.id, ws.urgent_count
                    ));
                }
            }
        }
        Ok(())
    }
}
