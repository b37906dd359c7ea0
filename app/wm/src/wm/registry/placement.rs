//! Moving clients between workspaces and contexts, and switching the shown
//! workspace or context.

use super::{Membership, Registry};
use crate::wm::client::ClientId;
use crate::wm::context::context_letter;
use crate::wm::ledger::ChangeRecord;
use crate::wm::workspace::{UserWorkspaceId, WorkspaceRef};

impl Registry {
    /// Relocates a top-level family from one workspace to another, keeping
    /// its cycle. Returns whether anything moved.
    fn relocate_family(&mut self, id: ClientId, from: UserWorkspaceId, to: UserWorkspaceId) -> bool {
        let family = self.family(id);
        let Some(source) = self.workspace_mut(from) else {
            return false;
        };
        let Some(membership) = Membership::of(source, id) else {
            return false;
        };
        source.remove_family(&family);
        let urgent: usize = family
            .iter()
            .filter(|&&member| self.clients.get(member).is_some_and(|c| c.flags.urgent))
            .count();
        if let Some(source) = self.workspace_mut(from) {
            source.urgent_count = source.urgent_count.saturating_sub(urgent);
        }

        let Some(target) = self.workspace_mut(to) else {
            return false;
        };
        membership.add_to(target, &family);
        target.urgent_count += urgent;
        for &member in &family {
            self.placement.insert(member, WorkspaceRef::User(to));
            self.home_context.insert(member, to.context);
        }
        true
    }

    /// Whether a client may leave its workspace: top-level, not sticky, and
    /// in a user workspace.
    fn movable_from(&self, id: ClientId) -> Option<UserWorkspaceId> {
        let client = self.clients.get(id)?;
        if client.parent.is_some() || client.flags.sticky {
            tracing::debug!(window = client.window, "client is transient or sticky, not moving");
            return None;
        }
        match self.placement.get(id)? {
            WorkspaceRef::User(ws) => Some(*ws),
            WorkspaceRef::Move | WorkspaceRef::Resize => None,
        }
    }

    /// Sends a client to another workspace of its context.
    pub fn client_to_workspace(&mut self, id: ClientId, index: usize) -> bool {
        let Some(from) = self.movable_from(id) else {
            return false;
        };
        if index >= self.workspace_count || index == from.index {
            return false;
        }
        let to = UserWorkspaceId::new(from.context, index);
        if !self.relocate_family(id, from, to) {
            return false;
        }
        tracing::debug!(from = %from, to = %to, "moved client to workspace");
        self.record(ChangeRecord::WorkspaceMove { id, from: Some(from), to: Some(to) });
        self.refocus_after_departure(id);
        true
    }

    /// Sends a client to the shown workspace of another context.
    pub fn client_to_context(&mut self, id: ClientId, context: usize) -> bool {
        let Some(from) = self.movable_from(id) else {
            return false;
        };
        if context >= self.context_count || context == from.context {
            return false;
        }
        let Some(index) = self.ensure_context(context).map(|ctx| ctx.activated) else {
            return false;
        };
        let to = UserWorkspaceId::new(context, index);
        if !self.relocate_family(id, from, to) {
            return false;
        }
        tracing::debug!(from = %from, to = %to, "moved client to context");
        self.record(ChangeRecord::ContextMove { id, from: from.context, to: context });
        self.refocus_after_departure(id);
        true
    }

    /// Moves focus off a family that left the shown workspace.
    fn refocus_after_departure(&mut self, id: ClientId) {
        let departed = self.focused.is_some_and(|focused| self.top_level(focused) == id);
        if departed {
            self.refocus_active();
        }
    }

    // ========================================================================
    // Activation
    // ========================================================================

    /// Shows another workspace of the active context.
    ///
    /// `from_cycle` marks next/previous activations: while they repeat, the
    /// context's previous slot keeps the workspace the sequence started from.
    pub fn change_active_workspace(&mut self, index: usize, from_cycle: bool) -> bool {
        let Some(current) = self.active_context().map(|ctx| ctx.activated) else {
            return false;
        };
        if index >= self.workspace_count || index == current {
            return false;
        }
        self.cancel_interaction();

        let keep_previous = from_cycle && self.cycling_workspaces;
        self.cycling_workspaces = from_cycle;
        let context = self.active_context;
        let Some(ctx) = self.active_context_mut() else {
            return false;
        };
        if !keep_previous {
            ctx.previous = Some(current);
        }
        ctx.activated = index;
        tracing::debug!(
            context = %context_letter(context),
            from = current + 1,
            to = index + 1,
            "activated workspace"
        );
        self.record(ChangeRecord::WorkspaceActivate { context, from: current, to: index });
        self.refocus_active();
        true
    }

    /// Makes another context active.
    pub fn change_active_context(&mut self, index: usize) -> bool {
        if index >= self.context_count || index == self.active_context {
            return false;
        }
        self.cancel_interaction();
        if self.ensure_context(index).is_none() {
            return false;
        }
        self.cycling_workspaces = false;
        let from = self.active_context;
        self.previous_context = Some(from);
        self.active_context = index;
        tracing::debug!(
            from = %context_letter(from),
            to = %context_letter(index),
            "activated context"
        );
        self.record(ChangeRecord::ContextActivate { from, to: index });
        self.refocus_active();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add, registry};
    use super::*;
    use crate::wm::ledger::RecordKind;

    #[test]
    fn test_client_to_workspace_moves_and_refocuses() {
        let mut registry = registry();
        let a = add(&mut registry, 1);
        let b = add(&mut registry, 2);
        registry.flush_changes();

        assert!(registry.client_to_workspace(b, 3));
        assert_eq!(registry.client_user_workspace(b), Some(UserWorkspaceId::new(0, 3)));
        assert_eq!(registry.focused(), Some(a));
        assert_eq!(
            registry.pending_changes().collect::<Vec<_>>(),
            vec![RecordKind::WorkspaceMove, RecordKind::Focus]
        );
        assert!(registry.check_consistency().is_ok());
    }

    #[test]
    fn test_client_to_workspace_guards() {
        let mut registry = registry();
        let a = add(&mut registry, 1);
        assert!(!registry.client_to_workspace(a, 0));
        assert!(!registry.client_to_workspace(a, 99));

        let mut child = crate::wm::client::Client::new(2, 1002, crate::wm::geometry::Rect::zero());
        child.parent = Some(a);
        let child = registry.manage(child, &crate::wm::rules::ManageRule::default()).unwrap();
        assert!(!registry.client_to_workspace(child, 1));
    }

    #[test]
    fn test_family_moves_together() {
        let mut registry = registry();
        let a = add(&mut registry, 1);
        let mut child = crate::wm::client::Client::new(2, 1002, crate::wm::geometry::Rect::zero());
        child.parent = Some(a);
        let child = registry.manage(child, &crate::wm::rules::ManageRule::default()).unwrap();

        assert!(registry.client_to_context(a, 1));
        assert_eq!(registry.client_user_workspace(child), Some(UserWorkspaceId::new(1, 0)));
        assert_eq!(registry.client_context(child), Some(1));
        assert_eq!(registry.focused(), None);
        assert!(registry.check_consistency().is_ok());
    }

    #[test]
    fn test_workspace_activation_tracks_previous() {
        let mut registry = registry();
        assert!(registry.change_active_workspace(2, false));
        assert!(!registry.change_active_workspace(2, false));
        assert_eq!(registry.active_context().unwrap().previous, Some(0));
        assert!(!registry.change_active_workspace(4, false));
    }

    #[test]
    fn test_cycling_keeps_sequence_start() {
        let mut registry = registry();
        registry.change_active_workspace(1, false);
        registry.change_active_workspace(2, true);
        registry.change_active_workspace(3, true);
        assert_eq!(registry.active_context().unwrap().previous, Some(1));
        registry.change_active_workspace(0, false);
        assert_eq!(registry.active_context().unwrap().previous, Some(3));
    }

    #[test]
    fn test_context_activation_refocuses() {
        let mut registry = registry();
        let a = add(&mut registry, 1);
        assert!(registry.change_active_context(1));
        assert_eq!(registry.focused(), None);
        assert!(!registry.change_active_context(1));
        assert!(registry.change_active_context(0));
        assert_eq!(registry.focused(), Some(a));
    }
}
