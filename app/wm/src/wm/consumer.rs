//! The change consumer.
//!
//! Turns ledger records into display side effects. Records are applied in
//! the order they were issued; each handler reads the registry's current
//! state, so a record about a client that has since been destroyed is
//! skipped rather than applied to a stale window.
//!
//! Workspace and context switches hide the outgoing windows first, drain the
//! unmap notifications those requests queued, and only then map the incoming
//! windows, so no window is ever shown on two desktops at once.

use super::backend::{Backend, NetState, WmState};
use super::client::{ClientFlags, ClientId, ExpectedEvent};
use super::context::context_letter;
use super::ledger::ChangeRecord;
use super::registry::{Registry, ToggleAction};
use super::workspace::{UserWorkspaceId, WorkspaceRef};
use crate::config::BorderColors;

// ============================================================================
// Consumer
// ============================================================================

/// Applies change records against a [`Backend`].
#[derive(Debug, Clone)]
pub struct ChangeConsumer {
    colors: BorderColors,
    /// Client currently held in a pseudo-workspace by a pointer grab.
    dragged: Option<ClientId>,
}

impl ChangeConsumer {
    #[must_use]
    pub const fn new(colors: BorderColors) -> Self { Self { colors, dragged: None } }

    /// Applies one record.
    pub fn apply<B: Backend>(&mut self, record: ChangeRecord, registry: &mut Registry, backend: &mut B) {
        tracing::trace!(kind = ?record.kind(), "consumer: applying record");
        match record {
            ChangeRecord::Focus { from, to } => self.on_focus(from, to, registry, backend),
            ChangeRecord::Destroy { client, workspace, origin, .. } => {
                backend.unregister_client(client.window);
                backend.destroy_frame(client.frame, client.window);
                if matches!(workspace, WorkspaceRef::Move | WorkspaceRef::Resize) {
                    self.release_pointer(backend);
                }
                for &child in &client.children {
                    if registry.client(child).is_some() {
                        registry.set_disowned(child, ToggleAction::Add);
                    }
                }
                if workspace.user().or(origin) == Some(registry.visible_workspace_id()) {
                    Self::arrange_visible(registry, backend);
                    Self::restack(registry, backend);
                }
                Self::redraw_indicators(registry, backend);
            }
            ChangeRecord::Fullscreen { id, .. }
            | ChangeRecord::Above { id, .. }
            | ChangeRecord::Below { id, .. }
            | ChangeRecord::Disown { id, .. } => self.refresh_client(id, registry, backend),
            ChangeRecord::Urgent { id, .. } => {
                self.refresh_client(id, registry, backend);
                Self::redraw_indicators(registry, backend);
            }
            ChangeRecord::Sticky { id, enabled } => {
                if let Some(window) = registry.client(id).map(|client| client.window) {
                    let desktop = if enabled {
                        None
                    } else {
                        registry.client_user_workspace(id).map(|ws| registry.desktop_index(ws))
                    };
                    backend.set_window_desktop(window, desktop);
                }
                self.refresh_client(id, registry, backend);
            }
            ChangeRecord::Iconify { id, enabled } => {
                for member in registry.family(id) {
                    if enabled {
                        Self::hide(member, WmState::Iconic, registry, backend);
                    } else if registry.is_visible(member) {
                        Self::show(member, registry, backend);
                    }
                }
                self.refresh_client(id, registry, backend);
            }
            ChangeRecord::WorkspaceMove { id, from, to } => {
                self.on_workspace_move(id, from, to, registry, backend);
            }
            ChangeRecord::ContextMove { id, .. } => {
                Self::sync_family(id, registry, backend);
                Self::arrange_visible(registry, backend);
                Self::restack(registry, backend);
                Self::redraw_indicators(registry, backend);
            }
            ChangeRecord::WorkspaceActivate { context, from, to } => {
                let outgoing = registry.shown_clients(UserWorkspaceId::new(context, from));
                let incoming = registry.shown_clients(UserWorkspaceId::new(context, to));
                Self::switch_desktop(&outgoing, &incoming, registry, backend);
            }
            ChangeRecord::ContextActivate { from, to } => {
                let shown = |registry: &Registry, index: usize| {
                    registry
                        .context(index)
                        .map(|ctx| registry.shown_clients(ctx.active_id()))
                        .unwrap_or_default()
                };
                let mut outgoing = shown(registry, from);
                let mut incoming = shown(registry, to);
                // Sticky clients follow their home context
                let sticky: Vec<(ClientId, usize)> = registry.sticky_clients().collect();
                for (id, home) in sticky {
                    if home == from && !outgoing.contains(&id) {
                        outgoing.push(id);
                    } else if home == to && !incoming.contains(&id) {
                        incoming.push(id);
                    }
                }
                Self::switch_desktop(&outgoing, &incoming, registry, backend);
            }
            ChangeRecord::Arrange { workspace, sidebar_changed } => {
                if workspace == registry.visible_workspace_id() {
                    if sidebar_changed {
                        backend.set_workarea(registry.work_area(workspace));
                    }
                    Self::arrange_visible(registry, backend);
                    Self::restack(registry, backend);
                }
                Self::redraw_indicators(registry, backend);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Record handlers
    // ------------------------------------------------------------------------

    fn on_focus<B: Backend>(
        &self,
        from: Option<ClientId>,
        to: Option<ClientId>,
        registry: &Registry,
        backend: &mut B,
    ) {
        if let Some(client) = from.and_then(|id| registry.client(id)) {
            backend.set_border(client.frame, self.border_color(&client.flags, false), self.colors.width);
            backend.grab_buttons(client.window, false);
        }
        match to.and_then(|id| registry.client(id)) {
            Some(client) => {
                backend.set_border(client.frame, self.colors.focused, self.colors.width);
                backend.grab_buttons(client.window, true);
                backend.set_input_focus(Some(client.window));
                backend.set_active_window(Some(client.window));
            }
            None => {
                backend.set_input_focus(None);
                backend.set_active_window(None);
            }
        }
        Self::restack(registry, backend);
    }

    fn on_workspace_move<B: Backend>(
        &mut self,
        id: ClientId,
        from: Option<UserWorkspaceId>,
        to: Option<UserWorkspaceId>,
        registry: &mut Registry,
        backend: &mut B,
    ) {
        let Some(client) = registry.client(id) else {
            tracing::debug!("consumer: workspace move for a client that is gone");
            return;
        };
        let (window, frame, autoclose) = (client.window, client.frame, client.autoclose);

        match (from, to) {
            // Back from a pseudo-workspace
            (None, Some(_)) if self.dragged == Some(id) => self.release_pointer(backend),
            // Freshly managed
            (None, Some(ws)) => {
                backend.register_client(window);
                backend.set_window_desktop(window, Some(registry.desktop_index(ws)));
                backend.set_border(frame, self.colors.unfocused, self.colors.width);
                backend.grab_buttons(window, false);
                if registry.is_visible(id) {
                    Self::show(id, registry, backend);
                } else {
                    backend.set_wm_state(window, WmState::Iconic);
                }
                if autoclose {
                    tracing::debug!(window, "closing autoclose client");
                    backend.close(window);
                }
            }
            (Some(_), None) => self.dragged = Some(id),
            (Some(_), Some(_)) => Self::sync_family(id, registry, backend),
            (None, None) => {}
        }
        Self::arrange_visible(registry, backend);
        Self::restack(registry, backend);
    }

    /// Publishes flags, border and stacking for a client whose state changed.
    fn refresh_client<B: Backend>(&self, id: ClientId, registry: &mut Registry, backend: &mut B) {
        let Some(client) = registry.client(id) else {
            tracing::debug!("consumer: flag change for a client that is gone");
            return;
        };
        let (window, frame, flags) = (client.window, client.frame, client.flags);
        backend.set_window_states(window, &NetState::from_flags(&flags));
        backend.redraw_client_state(window, &flags);
        let focused = registry.focused() == Some(id);
        backend.set_border(frame, self.border_color(&flags, focused), self.colors.width);

        if registry.is_visible(id) {
            Self::arrange_visible(registry, backend);
        }
        Self::restack(registry, backend);
    }

    // ------------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------------

    fn show<B: Backend>(id: ClientId, registry: &mut Registry, backend: &mut B) {
        let Some(client) = registry.client_mut(id) else {
            return;
        };
        client.expect = None;
        backend.map(client.frame);
        backend.map(client.window);
        backend.set_wm_state(client.window, WmState::Normal);
    }

    fn hide<B: Backend>(id: ClientId, state: WmState, registry: &mut Registry, backend: &mut B) {
        let Some(client) = registry.client_mut(id) else {
            return;
        };
        // The echo of our own unmap must not unmanage the client
        client.expect = Some(ExpectedEvent::Unmap);
        backend.unmap(client.window);
        backend.unmap(client.frame);
        backend.set_wm_state(client.window, state);
    }

    /// Maps or unmaps every member of a family to match the model and
    /// republishes its desktop.
    fn sync_family<B: Backend>(id: ClientId, registry: &mut Registry, backend: &mut B) {
        for member in registry.family(id) {
            if registry.is_visible(member) {
                Self::show(member, registry, backend);
            } else {
                Self::hide(member, WmState::Iconic, registry, backend);
            }
            let desktop = registry.client_user_workspace(member).map(|ws| registry.desktop_index(ws));
            if let Some(client) = registry.client(member)
                && !client.flags.sticky
            {
                backend.set_window_desktop(client.window, desktop);
            }
        }
    }

    /// Unmap, drain, then map.
    fn switch_desktop<B: Backend>(
        outgoing: &[ClientId],
        incoming: &[ClientId],
        registry: &mut Registry,
        backend: &mut B,
    ) {
        let hidden: Vec<ClientId> = outgoing
            .iter()
            .copied()
            .filter(|&id| !incoming.contains(&id) && !registry.is_visible(id))
            .collect();

        let mut windows = Vec::with_capacity(hidden.len() * 2);
        for &id in &hidden {
            Self::hide(id, WmState::Iconic, registry, backend);
            if let Some(client) = registry.client(id) {
                windows.extend([client.window, client.frame]);
            }
        }
        if !windows.is_empty() {
            let drained = backend.drain_unmap_notifications(&windows);
            tracing::trace!(drained, "consumer: drained unmap notifications");
        }
        for &id in &hidden {
            if let Some(client) = registry.client_mut(id) {
                client.expect = None;
            }
        }

        for &id in incoming {
            if registry.is_visible(id) {
                Self::show(id, registry, backend);
            }
        }

        let visible = registry.visible_workspace_id();
        backend.set_current_desktop(registry.desktop_index(visible));
        Self::arrange_visible(registry, backend);
        Self::restack(registry, backend);
        Self::redraw_indicators(registry, backend);
    }

    // ------------------------------------------------------------------------
    // Shared effects
    // ------------------------------------------------------------------------

    /// Applies the geometry of the shown workspace.
    pub fn arrange_visible<B: Backend>(registry: &mut Registry, backend: &mut B) {
        let visible = registry.visible_workspace_id();
        for (frame, geometry) in registry.arrange(visible) {
            backend.move_resize(frame, geometry);
        }
    }

    /// Applies the full stacking order in one request.
    pub fn restack<B: Backend>(registry: &Registry, backend: &mut B) {
        backend.restack(&registry.stacking_order());
    }

    fn redraw_indicators<B: Backend>(registry: &Registry, backend: &mut B) {
        let visible = registry.visible_workspace_id();
        backend.redraw_workspace_indicators(context_letter(visible.context), visible.index + 1);
    }

    fn release_pointer<B: Backend>(&mut self, backend: &mut B) {
        self.dragged = None;
        backend.release_pointer();
    }

    const fn border_color(&self, flags: &ClientFlags, focused: bool) -> u32 {
        if focused {
            self.colors.focused
        } else if flags.urgent {
            self.colors.urgent
        } else {
            self.colors.unfocused
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::wm::backend::{Effect, RecordingBackend};
    use crate::wm::client::Client;
    use crate::wm::geometry::Rect;
    use crate::wm::rules::ManageRule;

    struct Harness {
        registry: Registry,
        consumer: ChangeConsumer,
        backend: RecordingBackend,
    }

    impl Harness {
        fn new() -> Self {
            let screen = Rect::new(0, 0, 1000, 800);
            let config = Config {
                contexts: 2,
                workspaces: 3,
                ..Config::default()
            };
            Self {
                registry: Registry::new(&config, screen).unwrap(),
                consumer: ChangeConsumer::new(BorderColors::default()),
                backend: RecordingBackend::new(screen),
            }
        }

        fn manage(&mut self, window: u32, rule: &ManageRule) -> ClientId {
            let frame = window + 100;
            let id = self.registry.manage(Client::new(window, frame, Rect::new(0, 0, 100, 100)), rule);
            self.drain();
            id.unwrap()
        }

        fn drain(&mut self) {
            while let Some(record) = self.registry.dequeue_change() {
                self.consumer.apply(record, &mut self.registry, &mut self.backend);
            }
        }
    }

    #[test]
    fn test_new_client_is_registered_and_mapped() {
        let mut h = Harness::new();
        h.manage(1, &ManageRule::default());
        assert!(h.backend.effects().contains(&Effect::RegisterClient { window: 1 }));
        assert!(h.backend.is_mapped(1));
        assert!(h.backend.is_mapped(101));
        assert!(h.backend.effects().contains(&Effect::SetInputFocus { window: Some(1) }));
    }

    #[test]
    fn test_autoclose_closes_after_placement() {
        let mut h = Harness::new();
        let rule = ManageRule {
            autoclose: true,
            ..ManageRule::default()
        };
        h.manage(1, &rule);
        assert!(h.backend.effects().contains(&Effect::Close { window: 1 }));
    }

    #[test]
    fn test_workspace_switch_unmaps_drains_then_maps() {
        let mut h = Harness::new();
        let a = h.manage(1, &ManageRule::default());
        let rule = ManageRule {
            workspace: Some(1),
            ..ManageRule::default()
        };
        h.manage(2, &rule);
        assert!(!h.backend.is_mapped(2));
        h.backend.clear();

        h.registry.change_active_workspace(1, false);
        h.drain();

        let effects = h.backend.effects();
        let unmap = effects.iter().position(|e| *e == Effect::Unmap { window: 1 }).unwrap();
        let drain = effects.iter().position(|e| matches!(e, Effect::DrainUnmaps { .. })).unwrap();
        let map = effects.iter().position(|e| *e == Effect::Map { window: 2 }).unwrap();
        assert!(unmap < drain && drain < map);
        assert!(matches!(effects[drain], Effect::DrainUnmaps { drained: 2, .. }));
        assert_eq!(h.registry.client(a).unwrap().expect, None);
        assert!(effects.contains(&Effect::CurrentDesktop { desktop: 1 }));
    }

    #[test]
    fn test_destroy_mid_drag_releases_pointer() {
        let mut h = Harness::new();
        let a = h.manage(1, &ManageRule { floating: true, ..ManageRule::default() });
        h.registry.start_moving(a, 0, 0);
        h.drain();
        h.backend.clear();

        h.registry.unmanage(a);
        h.drain();
        let effects = h.backend.effects();
        assert!(effects.contains(&Effect::ReleasePointer));
        assert!(effects.contains(&Effect::DestroyFrame { frame: 101, window: 1 }));
    }

    #[test]
    fn test_destroy_disowns_children() {
        let mut h = Harness::new();
        let parent = h.manage(1, &ManageRule::default());
        let mut child = Client::new(2, 102, Rect::zero());
        child.parent = Some(parent);
        let child = h.registry.manage(child, &ManageRule::default()).unwrap();
        h.drain();

        h.registry.unmanage(parent);
        h.drain();
        assert!(h.registry.client(child).unwrap().flags.disowned);
        assert!(h.registry.check_consistency().is_ok());
    }

    #[test]
    fn test_iconify_marks_expected_unmap() {
        let mut h = Harness::new();
        let a = h.manage(1, &ManageRule::default());
        h.registry.set_iconified(a, ToggleAction::Add);
        h.drain();
        assert!(!h.backend.is_mapped(1));
        assert_eq!(h.registry.client(a).unwrap().expect, Some(ExpectedEvent::Unmap));
        assert!(h.backend.effects().contains(&Effect::SetWmState {
            window: 1,
            state: WmState::Iconic
        }));
    }

    #[test]
    fn test_sidebar_publishes_workarea() {
        let mut h = Harness::new();
        h.registry.toggle_sidebar();
        h.drain();
        assert!(h.backend.effects().contains(&Effect::Workarea { area: Rect::new(24, 0, 976, 800) }));
    }
}
