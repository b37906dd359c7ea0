//! Event and command dispatch.
//!
//! [`WindowManager`] ties the registry, the change consumer and a backend
//! together. Every entry point mutates the registry, then drains the ledger
//! through the consumer before returning, so side effects of one event are
//! fully applied before the next one is looked at.

use std::process::{Command as Process, Stdio};

use super::backend::{Backend, NetState, WindowAttributes};
use super::client::{Client, ClientId, ExpectedEvent};
use super::consumer::ChangeConsumer;
use super::context::context_index;
use super::cycle::Direction;
use super::events::{Command, ProtocolEvent};
use super::geometry::{Rect, WindowId};
use super::layout::LayoutMode;
use super::ledger::RecordKind;
use super::registry::{InteractionKind, Registry, ToggleAction};
use super::snapshot::StateSnapshot;
use super::stack::Layer;
use crate::config::Config;
use crate::error::{WmError, WmResult};

/// The window manager core bound to one backend.
#[derive(Debug)]
pub struct WindowManager<B: Backend> {
    registry: Registry,
    consumer: ChangeConsumer,
    backend: B,
}

impl<B: Backend> WindowManager<B> {
    /// Builds a manager for the backend's screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the screen has no
    /// area, or another window manager owns the display.
    pub fn new(config: &Config, mut backend: B) -> WmResult<Self> {
        let colors = config.borders.resolve()?;
        let screen = backend.screen_geometry();
        if !screen.is_valid() {
            return Err(WmError::DisplayUnavailable(format!("screen {screen} has no area")));
        }
        if !backend.claim_display() {
            return Err(WmError::AnotherWmRunning);
        }
        let registry = Registry::new(config, screen)?;
        Ok(Self {
            registry,
            consumer: ChangeConsumer::new(colors),
            backend,
        })
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry { &self.registry }

    pub const fn registry_mut(&mut self) -> &mut Registry { &mut self.registry }

    #[must_use]
    pub const fn backend(&self) -> &B { &self.backend }

    pub const fn backend_mut(&mut self) -> &mut B { &mut self.backend }

    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot { self.registry.snapshot() }

    /// Manages every window that already exists.
    ///
    /// # Returns
    ///
    /// The number of clients managed.
    pub fn bootstrap(&mut self) -> usize {
        let existing = self.backend.query_toplevel();
        tracing::debug!(count = existing.len(), "bootstrapping existing windows");
        for attributes in existing {
            self.map_window(attributes);
        }
        self.process_queued_changes();
        self.registry.client_count()
    }

    /// Drains the ledger through the consumer.
    ///
    /// # Returns
    ///
    /// The kinds of the records applied, in order.
    pub fn process_queued_changes(&mut self) -> Vec<RecordKind> {
        let mut applied = Vec::new();
        while let Some(record) = self.registry.dequeue_change() {
            applied.push(record.kind());
            self.consumer.apply(record, &mut self.registry, &mut self.backend);
        }
        applied
    }

    // ========================================================================
    // Protocol events
    // ========================================================================

    /// Handles one protocol event and applies its side effects.
    pub fn handle_event(&mut self, event: ProtocolEvent) -> Vec<RecordKind> {
        tracing::trace!(event = event.name(), "handling event");
        match event {
            ProtocolEvent::MapRequest { attributes } => self.map_window(attributes),
            ProtocolEvent::UnmapNotify { window } => self.unmap_window(window),
            ProtocolEvent::DestroyNotify { window } => {
                if let Some(id) = self.registry.win_client(window) {
                    self.registry.unmanage(id);
                } else if self.registry.stack_mut().remove(window) {
                    ChangeConsumer::restack(&self.registry, &mut self.backend);
                }
            }
            ProtocolEvent::ConfigureRequest { window, geometry } => {
                self.configure_window(window, geometry);
            }
            ProtocolEvent::EnterNotify { window } => {
                if self.registry.focus_follows_mouse()
                    && self.registry.interaction_client().is_none()
                    && let Some(id) = self.registry.win_client(window)
                {
                    self.registry.focus(id, false);
                }
            }
            ProtocolEvent::ButtonPress { window, action, x, y } => {
                let Some(id) = self.registry.win_client(window) else {
                    tracing::debug!(window, "button press on unmanaged window");
                    return self.process_queued_changes();
                };
                self.registry.focus(id, false);
                match action {
                    Some(InteractionKind::Move) => {
                        self.registry.start_moving(id, x, y);
                    }
                    Some(InteractionKind::Resize) => {
                        self.registry.start_resizing(id, x, y);
                    }
                    None => {}
                }
            }
            ProtocolEvent::MotionNotify { x, y } => {
                if let Some((frame, geometry)) = self.registry.motion(x, y) {
                    self.backend.move_resize(frame, geometry);
                }
            }
            ProtocolEvent::ButtonRelease => match self.registry.interaction_kind() {
                Some(InteractionKind::Move) => {
                    self.registry.stop_moving();
                }
                Some(InteractionKind::Resize) => {
                    self.registry.stop_resizing();
                }
                None => {}
            },
            ProtocolEvent::StateRequest { window, state, action } => {
                if let Some(id) = self.registry.win_client(window) {
                    self.apply_state(id, state, action);
                }
            }
            ProtocolEvent::ActivateRequest { window } => {
                if let Some(id) = self.registry.win_client(window) {
                    self.registry.activate_client(id, false);
                }
            }
            ProtocolEvent::UrgencyHint { window, urgent } => {
                if let Some(id) = self.registry.win_client(window) {
                    let action = if urgent { ToggleAction::Add } else { ToggleAction::Remove };
                    self.registry.set_urgent(id, action);
                }
            }
            ProtocolEvent::LayerWindow { window, layer, geometry } => {
                self.layer_window(window, layer, geometry);
            }
            ProtocolEvent::LayerWindowGone { window } => {
                if self.registry.stack_mut().remove(window) {
                    ChangeConsumer::restack(&self.registry, &mut self.backend);
                }
            }
        }
        self.process_queued_changes()
    }

    fn map_window(&mut self, attributes: WindowAttributes) {
        let window = attributes.window;
        if let Some(id) = self.registry.win_client(window) {
            // A client mapping itself again leaves the icon cycle
            if self.registry.client(id).is_some_and(|client| client.flags.iconified) {
                self.registry.set_iconified(id, ToggleAction::Remove);
                self.registry.focus(id, false);
            }
            return;
        }
        if self.registry.stack().contains(window) {
            tracing::debug!(window, "map request from a layer window");
            self.backend.map(window);
            return;
        }

        let frame = self.backend.create_frame(window, attributes.geometry);
        let mut rule =
            self.registry.rules().resolve(&attributes.class, &attributes.instance, &attributes.title);
        rule.fullscreen |= attributes.fullscreen;

        let mut client = Client::new(window, frame, attributes.geometry).with_names(
            attributes.class,
            attributes.instance,
            attributes.title,
        );
        client.hints = attributes.hints;
        client.flags.invincible = attributes.invincible;
        client.flags.in_window_fullscreen = attributes.in_window_fullscreen;
        client.parent = attributes.transient_for.and_then(|parent| self.registry.win_client(parent));

        if self.registry.manage(client, &rule).is_none() {
            self.backend.destroy_frame(frame, window);
        }
    }

    fn unmap_window(&mut self, window: WindowId) {
        let Some(id) = self.registry.win_client(window) else {
            return;
        };
        let Some(client) = self.registry.client_mut(id) else {
            return;
        };
        if client.window != window {
            return;
        }
        if client.expect == Some(ExpectedEvent::Unmap) {
            client.expect = None;
            return;
        }
        self.registry.unmanage(id);
    }

    /// Floating clients and transients get what they ask for; tiled clients
    /// are told their current geometry again.
    fn configure_window(&mut self, window: WindowId, geometry: Rect) {
        let Some(id) = self.registry.win_client(window) else {
            if self.registry.stack().contains(window) {
                self.registry.stack_mut().set_geometry(window, geometry);
            }
            self.backend.move_resize(window, geometry);
            return;
        };
        let floating_layout = self
            .registry
            .client_user_workspace(id)
            .and_then(|ws| self.registry.workspace(ws))
            .is_some_and(|ws| ws.layout.mode == LayoutMode::Floating);
        let Some(client) = self.registry.client_mut(id) else {
            return;
        };

        let free = client.flags.floating || client.parent.is_some() || floating_layout;
        if free && !client.is_out_of_window_fullscreen() {
            let (width, height) = client.hints.constrain(geometry.width, geometry.height);
            let geometry = Rect::new(geometry.x, geometry.y, width, height);
            client.float_geometry = geometry;
            client.geometry = geometry;
        }
        self.backend.move_resize(client.frame, client.geometry);
    }

    fn apply_state(&mut self, id: ClientId, state: NetState, action: ToggleAction) -> bool {
        match state {
            NetState::Fullscreen => self.registry.set_fullscreen(id, action),
            NetState::Above => self.registry.set_above(id, action),
            NetState::Below => self.registry.set_below(id, action),
            NetState::Sticky => self.registry.set_sticky(id, action),
            NetState::Hidden => self.registry.set_iconified(id, action),
            NetState::DemandsAttention => self.registry.set_urgent(id, action),
        }
    }

    fn layer_window(&mut self, window: WindowId, layer: Layer, geometry: Rect) {
        if self.registry.win_client(window).is_some() {
            tracing::debug!(window, "managed window cannot join a layer");
            return;
        }
        let stack = self.registry.stack_mut();
        if !stack.add(window, layer, geometry) {
            stack.relayer(window, layer);
            stack.set_geometry(window, geometry);
        }
        ChangeConsumer::restack(&self.registry, &mut self.backend);
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Runs one user command and applies its side effects.
    pub fn handle_command(&mut self, command: Command) -> Vec<RecordKind> {
        let handled = self.run_command(&command);
        tracing::debug!(?command, handled, "command");
        self.process_queued_changes()
    }

    fn run_command(&mut self, command: &Command) -> bool {
        let registry = &mut self.registry;
        match command {
            Command::FocusNext => registry.focus_step(Direction::Forward),
            Command::FocusPrev => registry.focus_step(Direction::Backward),
            Command::FocusIndex { index } => {
                index.checked_sub(1).is_some_and(|index| registry.focus_index(index))
            }
            Command::SwapNext => registry.swap(Direction::Forward),
            Command::SwapPrev => registry.swap(Direction::Backward),
            Command::Workspace { index } => index
                .checked_sub(1)
                .is_some_and(|index| registry.change_active_workspace(index, false)),
            Command::Context { letter } => {
                context_index(*letter).is_some_and(|index| registry.change_active_context(index))
            }
            Command::ToggleWorkspace => registry.toggle_workspace(),
            Command::ToggleContext => registry.toggle_context(),
            Command::NextWorkspace => registry.step_workspace(Direction::Forward),
            Command::PrevWorkspace => registry.step_workspace(Direction::Backward),
            Command::SendToWorkspace { index } => registry
                .focused()
                .zip(index.checked_sub(1))
                .is_some_and(|(id, index)| registry.client_to_workspace(id, index)),
            Command::SendToContext { letter } => registry
                .focused()
                .zip(context_index(*letter))
                .is_some_and(|(id, index)| registry.client_to_context(id, index)),
            Command::SetLayout { mode } => registry.set_layout(*mode),
            Command::ToggleLayout => registry.toggle_layout(),
            Command::AdjustNmaster { delta } => registry.adjust_nmaster(*delta),
            Command::AdjustMfactor { delta } => registry.adjust_mfactor(*delta),
            Command::AdjustGap { delta } => registry.adjust_gap(*delta),
            Command::ToggleMirror => registry.toggle_mirror(),
            Command::ToggleSidebar => registry.toggle_sidebar(),
            Command::ResetLayout => registry.reset_layout(),
            Command::RotateMaster { direction } => registry.rotate_master(*direction),
            Command::RotateStack { direction } => registry.rotate_stack(*direction),
            Command::RotateClients { direction } => registry.rotate_clients(*direction),
            Command::Zoom => registry.zoom(),
            Command::JumpPane => registry.jump_pane(),
            Command::Fullscreen => self.toggle_focused(Registry::set_fullscreen),
            Command::Above => self.toggle_focused(Registry::set_above),
            Command::Below => self.toggle_focused(Registry::set_below),
            Command::Sticky => self.toggle_focused(Registry::set_sticky),
            Command::Iconify => self.toggle_focused(Registry::set_iconified),
            Command::Disown => self.toggle_focused(Registry::set_disowned),
            Command::Deiconify => registry.deiconify_last(),
            Command::Mark => registry.mark(),
            Command::JumpMarked => registry.jump_marked(),
            Command::JumpProcess { name } => registry.jump_process(name),
            Command::Close => self.close_focused(),
            Command::Spawn { shell } => spawn(shell),
        }
    }

    fn toggle_focused(&mut self, op: fn(&mut Registry, ClientId, ToggleAction) -> bool) -> bool {
        let Some(id) = self.registry.focused() else {
            tracing::debug!("toggle: nothing focused");
            return false;
        };
        op(&mut self.registry, id, ToggleAction::Toggle)
    }

    fn close_focused(&mut self) -> bool {
        let Some(client) = self.registry.focused().and_then(|id| self.registry.client(id)) else {
            return false;
        };
        if client.flags.invincible {
            tracing::debug!(window = client.window, "refusing to close invincible client");
            return false;
        }
        self.backend.close(client.window);
        true
    }
}

/// Launches `command` through `sh -c` without waiting for it.
fn spawn(command: &str) -> bool {
    let expanded = shellexpand::tilde(command);
    match Process::new("sh")
        .arg("-c")
        .arg(expanded.as_ref())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            tracing::debug!(pid = child.id(), command, "spawned");
            // Reap in the background so the loop never blocks
            std::thread::spawn(move || child.wait());
            true
        }
        Err(err) => {
            tracing::warn!(command, error = %err, "failed to spawn");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::backend::{Effect, RecordingBackend};

    fn manager() -> WindowManager<RecordingBackend> {
        let config = Config {
            contexts: 2,
            workspaces: 3,
            ..Config::default()
        };
        WindowManager::new(&config, RecordingBackend::new(Rect::new(0, 0, 1000, 800))).unwrap()
    }

    fn map(manager: &mut WindowManager<RecordingBackend>, window: WindowId) -> Vec<RecordKind> {
        let attributes = WindowAttributes {
            window,
            geometry: Rect::new(10, 10, 300, 200),
            class: format!("app{window}"),
            ..WindowAttributes::default()
        };
        manager.handle_event(ProtocolEvent::MapRequest { attributes })
    }

    #[test]
    fn test_startup_rejects_unusable_display() {
        let config = Config::default();
        let err = WindowManager::new(&config, RecordingBackend::new(Rect::new(0, 0, 0, 800)))
            .err()
            .unwrap();
        assert!(matches!(err, WmError::DisplayUnavailable(_)));

        let occupied = RecordingBackend::new(Rect::new(0, 0, 1000, 800)).occupied();
        let err = WindowManager::new(&config, occupied).err().unwrap();
        assert!(matches!(err, WmError::AnotherWmRunning));
    }

    #[test]
    fn test_map_request_manages_and_focuses() {
        let mut wm = manager();
        let applied = map(&mut wm, 5);
        assert_eq!(applied, vec![RecordKind::WorkspaceMove, RecordKind::Focus]);
        let id = wm.registry().win_client(5).unwrap();
        assert_eq!(wm.registry().focused(), Some(id));
        assert!(wm.backend().is_mapped(5));
    }

    #[test]
    fn test_duplicate_map_request_is_ignored() {
        let mut wm = manager();
        map(&mut wm, 5);
        assert!(map(&mut wm, 5).is_empty());
        assert_eq!(wm.registry().client_count(), 1);
    }

    #[test]
    fn test_expected_unmap_does_not_unmanage() {
        let mut wm = manager();
        map(&mut wm, 5);
        wm.handle_command(Command::Iconify);
        wm.handle_event(ProtocolEvent::UnmapNotify { window: 5 });
        assert_eq!(wm.registry().client_count(), 1);

        // A second unmap is client-initiated
        wm.handle_event(ProtocolEvent::UnmapNotify { window: 5 });
        assert_eq!(wm.registry().client_count(), 0);
    }

    #[test]
    fn test_configure_request_of_tiled_client_is_refused() {
        let mut wm = manager();
        map(&mut wm, 5);
        let id = wm.registry().win_client(5).unwrap();
        let tiled = wm.registry().client(id).unwrap().geometry;
        wm.handle_event(ProtocolEvent::ConfigureRequest {
            window: 5,
            geometry: Rect::new(1, 2, 3, 4),
        });
        let frame = wm.registry().client(id).unwrap().frame;
        assert_eq!(wm.backend().last_geometry(frame), Some(tiled));
    }

    #[test]
    fn test_workspace_command_is_one_based() {
        let mut wm = manager();
        let applied = wm.handle_command(Command::Workspace { index: 2 });
        assert!(applied.contains(&RecordKind::WorkspaceActivate));
        assert_eq!(wm.snapshot().workspace, 2);
        assert!(wm.handle_command(Command::Workspace { index: 0 }).is_empty());
        assert!(wm.handle_command(Command::Workspace { index: 9 }).is_empty());
    }

    #[test]
    fn test_close_skips_invincible() {
        let mut wm = manager();
        let attributes = WindowAttributes {
            window: 5,
            invincible: true,
            ..WindowAttributes::default()
        };
        wm.handle_event(ProtocolEvent::MapRequest { attributes });
        wm.backend_mut().clear();
        wm.handle_command(Command::Close);
        assert!(!wm.backend().effects().contains(&Effect::Close { window: 5 }));
    }

    #[test]
    fn test_layer_window_joins_stacking_order() {
        let mut wm = manager();
        map(&mut wm, 5);
        wm.handle_event(ProtocolEvent::LayerWindow {
            window: 77,
            layer: Layer::Dock,
            geometry: Rect::new(0, 0, 1000, 20),
        });
        let frame = wm.registry().client(wm.registry().win_client(5).unwrap()).unwrap().frame;
        assert_eq!(wm.backend().last_restack(), Some([frame, 77].as_slice()));

        wm.handle_event(ProtocolEvent::LayerWindowGone { window: 77 });
        assert_eq!(wm.backend().last_restack(), Some([frame].as_slice()));
    }

    #[test]
    fn test_drag_moves_floating_client() {
        let mut wm = manager();
        map(&mut wm, 5);
        wm.handle_command(Command::Above);
        wm.handle_event(ProtocolEvent::ButtonPress {
            window: 5,
            action: Some(InteractionKind::Move),
            x: 100,
            y: 100,
        });
        assert!(wm.registry().interaction_client().is_some());
        wm.handle_event(ProtocolEvent::MotionNotify { x: 150, y: 120 });
        wm.handle_event(ProtocolEvent::ButtonRelease);

        let id = wm.registry().win_client(5).unwrap();
        assert!(wm.registry().interaction_client().is_none());
        assert_eq!(wm.registry().client(id).unwrap().float_geometry, Rect::new(60, 30, 300, 200));
        assert!(wm.backend().effects().contains(&Effect::ReleasePointer));
    }
}
