//! Manage / unmanage.

use super::{Membership, Registry, ToggleAction};
use crate::wm::client::{Client, ClientId};
use crate::wm::ledger::ChangeRecord;
use crate::wm::rules::ManageRule;
use crate::wm::workspace::{UserWorkspaceId, WorkspaceRef};

impl Registry {
    /// Resolves the workspace a new client goes to.
    ///
    /// Priority: the parent's workspace, then the rule's explicit target,
    /// then the shown workspace. A transient always shares its parent's
    /// workspace. Out-of-range rule targets are ignored.
    fn destination(&mut self, parent: Option<ClientId>, rule: &ManageRule) -> Option<UserWorkspaceId> {
        if let Some(parent) = parent
            && let Some(ws) = self.client_user_workspace(parent)
        {
            return Some(ws);
        }
        if rule.has_target() {
            let context = rule
                .context
                .filter(|&index| index < self.context_count)
                .unwrap_or(self.active_context);
            let workspace_count = self.workspace_count;
            let ctx = self.ensure_context(context)?;
            let index = rule
                .workspace
                .filter(|&index| index < workspace_count)
                .unwrap_or(ctx.activated);
            return Some(UserWorkspaceId::new(context, index));
        }
        Some(self.visible_workspace_id())
    }

    /// Registers a new client and focuses it.
    ///
    /// The client's frame must already exist. `client.parent` names the owner
    /// of a transient window; an unknown parent is dropped.
    ///
    /// # Returns
    ///
    /// The new handle, or `None` if one of the client's windows is already
    /// managed.
    pub fn manage(&mut self, mut client: Client, rule: &ManageRule) -> Option<ClientId> {
        if self.windows.contains_key(&client.window) || self.windows.contains_key(&client.frame) {
            tracing::debug!(window = client.window, "manage: window already managed");
            return None;
        }

        client.parent = client.parent.filter(|&parent| self.clients.contains_key(parent));
        let Some(destination) = self.destination(client.parent, rule) else {
            tracing::debug!(window = client.window, "manage: no destination workspace");
            return None;
        };

        client.flags.floating |= rule.floating;
        client.autoclose = rule.autoclose;
        if rule.center {
            client.float_geometry = client.float_geometry.centered_in(&self.screen);
            client.geometry = client.float_geometry;
        }
        let (window, frame, parent, urgent) =
            (client.window, client.frame, client.parent, client.flags.urgent);
        client.flags.urgent = false;

        let id = self.clients.insert(client);
        self.windows.insert(window, id);
        self.windows.insert(frame, id);
        self.placement.insert(id, WorkspaceRef::User(destination));
        self.home_context.insert(id, destination.context);
        if let Some(parent) = parent
            && let Some(owner) = self.clients.get_mut(parent)
        {
            owner.children.push(id);
        }

        // Transients join their parent's cycle and stickiness
        let (membership, parent_sticky) = parent
            .and_then(|parent| {
                let ws = self.workspace(self.client_user_workspace(parent)?)?;
                Some((Membership::of(ws, parent)?, self.is_sticky(parent)))
            })
            .unwrap_or((Membership::Live, false));
        if let Some(ws) = self.workspace_mut(destination) {
            membership.add_to(ws, &[id]);
        }
        tracing::debug!(window, workspace = %destination, "managed client");
        self.record(ChangeRecord::WorkspaceMove { id, from: None, to: Some(destination) });

        if parent_sticky {
            self.replicate_sticky(id, membership);
        }
        if let Some(client) = self.clients.get_mut(id) {
            match membership {
                Membership::Live => {}
                Membership::Icon => client.flags.iconified = true,
                Membership::Disowned => client.flags.disowned = true,
            }
        }
        if urgent {
            self.set_urgent(id, ToggleAction::Add);
        }
        if rule.fullscreen {
            self.set_fullscreen(id, ToggleAction::Add);
        }
        self.focus(id, false);
        Some(id)
    }

    /// Gives a transient of a sticky client the same replication.
    fn replicate_sticky(&mut self, id: ClientId, membership: Membership) {
        let Some(WorkspaceRef::User(home)) = self.placement.get(id).copied() else {
            return;
        };
        if let Some(client) = self.clients.get_mut(id) {
            client.flags.sticky = true;
        }
        let Some(context) = self.context_mut(home.context) else {
            return;
        };
        for ws in context.workspaces_mut() {
            if ws.id != home {
                membership.add_to(ws, &[id]);
            }
        }
        context.record_sticky(1);
        self.record(ChangeRecord::Sticky { id, enabled: true });
    }

    /// Unregisters a client whose window went away.
    ///
    /// Transient flags are reversed through the regular toggles first, so the
    /// consumer sees the same records it would for an interactive change.
    pub fn unmanage(&mut self, id: ClientId) -> bool {
        let Some(window) = self.clients.get(id).map(|client| client.window) else {
            tracing::debug!("unmanage: unknown client");
            return false;
        };

        if let Some(flags) = self.clients.get(id).map(|client| client.flags) {
            if flags.iconified {
                self.set_iconified(id, ToggleAction::Remove);
            }
            if flags.disowned {
                self.set_disowned(id, ToggleAction::Remove);
            }
            if flags.sticky {
                self.set_sticky(id, ToggleAction::Remove);
            }
            if flags.urgent {
                self.set_urgent(id, ToggleAction::Remove);
            }
        }

        // A client dying mid-drag keeps its pseudo-workspace for the record
        let mut origin = None;
        if self.interaction.as_ref().is_some_and(|interaction| interaction.client == id)
            && let Some(interaction) = self.interaction.take()
        {
            origin = Some(interaction.origin);
            let transients: Vec<ClientId> = self.family(id).into_iter().skip(1).collect();
            for &member in &transients {
                self.placement.insert(member, WorkspaceRef::User(interaction.origin));
            }
            if let Some(ws) = self.workspace_mut(interaction.origin) {
                ws.add_family(&transients);
            }
        }

        let workspace = self
            .placement
            .get(id)
            .copied()
            .unwrap_or(WorkspaceRef::User(self.visible_workspace_id()));

        // Detach from the family tree
        let (parent, children) = self
            .clients
            .get(id)
            .map(|client| (client.parent, client.children.clone()))
            .unwrap_or_default();
        if let Some(parent) = parent
            && let Some(owner) = self.clients.get_mut(parent)
        {
            owner.children.retain(|&child| child != id);
        }
        for child in children {
            if let Some(child) = self.clients.get_mut(child) {
                child.parent = None;
            }
        }

        if let WorkspaceRef::User(ws) = workspace
            && let Some(ws) = self.workspace_mut(ws)
        {
            ws.remove_family(&[id]);
        }
        self.placement.remove(id);
        self.home_context.remove(id);
        self.mru.retain(|&c| c != id);
        for context in self.contexts.iter_mut().flatten() {
            context.forget(id);
        }
        self.snapshots.forget(id);

        let was_focused = self.focused == Some(id);
        if was_focused {
            self.focused = None;
        }

        let Some(client) = self.clients.remove(id) else {
            return false;
        };
        self.windows.remove(&client.window);
        self.windows.remove(&client.frame);
        tracing::debug!(window, ?workspace, "unmanaged client");
        self.record(ChangeRecord::Destroy {
            id,
            client: Box::new(client),
            workspace,
            origin,
        });

        if was_focused {
            self.refocus_active();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add, registry};
    use super::*;
    use crate::wm::geometry::Rect;
    use crate::wm::ledger::RecordKind;

    #[test]
    fn test_manage_goes_to_active_workspace_and_focuses() {
        let mut registry = registry();
        let id = add(&mut registry, 1);
        assert_eq!(registry.win_client(1), Some(id));
        assert_eq!(registry.win_client(1001), Some(id));
        assert_eq!(registry.focused(), Some(id));
        assert_eq!(
            registry.pending_changes().collect::<Vec<_>>(),
            vec![RecordKind::WorkspaceMove, RecordKind::Focus]
        );
    }

    #[test]
    fn test_transient_ignores_rule_target_and_moves_with_parent() {
        let mut registry = registry();
        let parent = add(&mut registry, 1);
        let mut child = Client::new(2, 1002, Rect::zero());
        child.parent = Some(parent);
        let rule = ManageRule {
            workspace: Some(2),
            ..ManageRule::default()
        };
        let child = registry.manage(child, &rule).unwrap();
        assert_eq!(registry.client_user_workspace(child), Some(UserWorkspaceId::new(0, 0)));

        assert!(registry.client_to_workspace(parent, 1));
        assert_eq!(registry.client_user_workspace(child), Some(UserWorkspaceId::new(0, 1)));
        assert!(registry.workspace(UserWorkspaceId::new(0, 2)).is_some_and(|ws| ws.is_empty()));
        assert!(registry.check_consistency().is_ok());
    }

    #[test]
    fn test_manage_rejects_duplicates() {
        let mut registry = registry();
        add(&mut registry, 1);
        let again = Client::new(1, 5000, Rect::zero());
        assert!(registry.manage(again, &ManageRule::default()).is_none());
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn test_rule_target_initializes_context() {
        let mut registry = registry();
        let rule = ManageRule {
            context: Some(2),
            workspace: Some(3),
            ..ManageRule::default()
        };
        let id = registry.manage(Client::new(1, 1001, Rect::zero()), &rule).unwrap();
        assert_eq!(registry.client_user_workspace(id), Some(UserWorkspaceId::new(2, 3)));
        assert!(registry.context(2).is_some());
        // Not on the shown workspace, so focus did not move
        assert_eq!(registry.focused(), None);
    }

    #[test]
    fn test_out_of_range_rule_target_is_ignored() {
        let mut registry = registry();
        let rule = ManageRule {
            context: Some(20),
            workspace: Some(40),
            ..ManageRule::default()
        };
        let id = registry.manage(Client::new(1, 1001, Rect::zero()), &rule).unwrap();
        assert_eq!(registry.client_user_workspace(id), Some(UserWorkspaceId::new(0, 0)));
    }

    #[test]
    fn test_transient_follows_parent_workspace() {
        let mut registry = registry();
        let rule = ManageRule {
            workspace: Some(2),
            ..ManageRule::default()
        };
        let parent = registry.manage(Client::new(1, 1001, Rect::zero()), &rule).unwrap();
        let mut child = Client::new(2, 1002, Rect::zero());
        child.parent = Some(parent);
        let child = registry.manage(child, &ManageRule::default()).unwrap();
        assert_eq!(registry.client_user_workspace(child), Some(UserWorkspaceId::new(0, 2)));
        assert_eq!(registry.client(parent).unwrap().children, vec![child]);
    }

    #[test]
    fn test_center_rule_centers_float_geometry() {
        let mut registry = registry();
        let rule = ManageRule {
            floating: true,
            center: true,
            ..ManageRule::default()
        };
        let id = registry.manage(Client::new(1, 1001, Rect::new(0, 0, 200, 100)), &rule).unwrap();
        let client = registry.client(id).unwrap();
        assert!(client.flags.floating);
        assert_eq!(client.float_geometry, Rect::new(400, 350, 200, 100));
    }

    #[test]
    fn test_unmanage_clears_every_lookup() {
        let mut registry = registry();
        let a = add(&mut registry, 1);
        let b = add(&mut registry, 2);
        registry.flush_changes();

        assert!(registry.unmanage(b));
        assert_eq!(registry.win_client(2), None);
        assert_eq!(registry.win_client(1002), None);
        assert!(registry.client(b).is_none());
        assert_eq!(registry.focused(), Some(a));
        assert!(!registry.mru().contains(&b));
        assert!(registry.check_consistency().is_ok());

        let Some(ChangeRecord::Destroy { client, workspace, .. }) = registry.dequeue_change() else {
            panic!("expected a destroy record first");
        };
        assert_eq!(client.window, 2);
        assert_eq!(workspace, WorkspaceRef::User(UserWorkspaceId::new(0, 0)));
        assert!(!registry.unmanage(b));
    }

    #[test]
    fn test_unmanage_parent_detaches_children() {
        let mut registry = registry();
        let parent = add(&mut registry, 1);
        let mut child = Client::new(2, 1002, Rect::zero());
        child.parent = Some(parent);
        let child = registry.manage(child, &ManageRule::default()).unwrap();

        registry.unmanage(parent);
        assert_eq!(registry.client(child).unwrap().parent, None);
        assert!(registry.check_consistency().is_ok());
    }
}
