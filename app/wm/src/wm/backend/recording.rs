//! In-memory backend that records every call.

use serde::Serialize;

use super::{DesktopHints, NetState, StatusSink, WindowAttributes, WindowOps, WmState};
use crate::wm::client::ClientFlags;
use crate::wm::geometry::{Rect, WindowId};

/// Frame ids are allocated from here so they never collide with client ids
/// used by tests and replays.
const FIRST_FRAME_ID: WindowId = 0x0100_0000;

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum Effect {
    CreateFrame { window: WindowId, frame: WindowId, geometry: Rect },
    DestroyFrame { frame: WindowId, window: WindowId },
    Map { window: WindowId },
    Unmap { window: WindowId },
    MoveResize { window: WindowId, geometry: Rect },
    Restack { windows: Vec<WindowId> },
    SetBorder { window: WindowId, color: u32, width: i32 },
    SetInputFocus { window: Option<WindowId> },
    GrabButtons { window: WindowId, focused: bool },
    SetWmState { window: WindowId, state: WmState },
    Close { window: WindowId },
    Kill { window: WindowId },
    ReleasePointer,
    DrainUnmaps { windows: Vec<WindowId>, drained: usize },
    ActiveWindow { window: Option<WindowId> },
    WindowDesktop { window: WindowId, desktop: Option<usize> },
    WindowStates { window: WindowId, states: Vec<NetState> },
    CurrentDesktop { desktop: usize },
    Workarea { area: Rect },
    RegisterClient { window: WindowId },
    UnregisterClient { window: WindowId },
    ClientIndicator { window: WindowId, flags: ClientFlags },
    WorkspaceIndicators { context: char, workspace: usize },
}

/// Backend that keeps an effect log instead of talking to a display.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    screen: Rect,
    toplevel: Vec<WindowAttributes>,
    next_frame: WindowId,
    /// Unmap notifications the fake display still has queued.
    queued_unmaps: Vec<WindowId>,
    effects: Vec<Effect>,
    /// A fake competing window manager owns the display.
    occupied: bool,
}

impl RecordingBackend {
    /// Creates a backend with the given screen and no existing windows.
    #[must_use]
    pub const fn new(screen: Rect) -> Self {
        Self {
            screen,
            toplevel: Vec::new(),
            next_frame: FIRST_FRAME_ID,
            queued_unmaps: Vec::new(),
            effects: Vec::new(),
            occupied: false,
        }
    }

    /// Seeds the windows reported by the startup scan.
    #[must_use]
    pub fn with_toplevel(mut self, windows: Vec<WindowAttributes>) -> Self {
        self.toplevel = windows;
        self
    }

    /// Pretends another window manager already owns the display.
    #[must_use]
    pub const fn occupied(mut self) -> Self {
        self.occupied = true;
        self
    }

    /// Recorded effects, oldest first.
    #[must_use]
    pub fn effects(&self) -> &[Effect] { &self.effects }

    /// Takes the recorded effects, leaving the log empty.
    pub fn take_effects(&mut self) -> Vec<Effect> { std::mem::take(&mut self.effects) }

    pub fn clear(&mut self) { self.effects.clear(); }

    /// Whether the last recorded visibility change of `window` was a map.
    #[must_use]
    pub fn is_mapped(&self, window: WindowId) -> bool {
        self.effects
            .iter()
            .rev()
            .find_map(|effect| match effect {
                Effect::Map { window: w } if *w == window => Some(true),
                Effect::Unmap { window: w } if *w == window => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// The most recent full stacking order.
    #[must_use]
    pub fn last_restack(&self) -> Option<&[WindowId]> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::Restack { windows } => Some(windows.as_slice()),
            _ => None,
        })
    }

    /// The most recent geometry given to `window`.
    #[must_use]
    pub fn last_geometry(&self, window: WindowId) -> Option<Rect> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::MoveResize { window: w, geometry } if *w == window => Some(*geometry),
            _ => None,
        })
    }

    fn record(&mut self, effect: Effect) {
        tracing::trace!(?effect, "backend");
        self.effects.push(effect);
    }
}

impl WindowOps for RecordingBackend {
    fn screen_geometry(&self) -> Rect { self.screen }

    fn claim_display(&mut self) -> bool { !self.occupied }

    fn query_toplevel(&self) -> Vec<WindowAttributes> { self.toplevel.clone() }

    fn create_frame(&mut self, window: WindowId, geometry: Rect) -> WindowId {
        let frame = self.next_frame;
        self.next_frame += 1;
        self.record(Effect::CreateFrame { window, frame, geometry });
        frame
    }

    fn destroy_frame(&mut self, frame: WindowId, window: WindowId) {
        self.record(Effect::DestroyFrame { frame, window });
    }

    fn map(&mut self, window: WindowId) {
        self.queued_unmaps.retain(|&w| w != window);
        self.record(Effect::Map { window });
    }

    fn unmap(&mut self, window: WindowId) {
        self.queued_unmaps.push(window);
        self.record(Effect::Unmap { window });
    }

    fn move_resize(&mut self, window: WindowId, geometry: Rect) {
        self.record(Effect::MoveResize { window, geometry });
    }

    fn restack(&mut self, windows: &[WindowId]) {
        self.record(Effect::Restack { windows: windows.to_vec() });
    }

    fn set_border(&mut self, window: WindowId, color: u32, width: i32) {
        self.record(Effect::SetBorder { window, color, width });
    }

    fn set_input_focus(&mut self, window: Option<WindowId>) {
        self.record(Effect::SetInputFocus { window });
    }

    fn grab_buttons(&mut self, window: WindowId, focused: bool) {
        self.record(Effect::GrabButtons { window, focused });
    }

    fn set_wm_state(&mut self, window: WindowId, state: WmState) {
        self.record(Effect::SetWmState { window, state });
    }

    fn close(&mut self, window: WindowId) { self.record(Effect::Close { window }); }

    fn kill(&mut self, window: WindowId) { self.record(Effect::Kill { window }); }

    fn release_pointer(&mut self) { self.record(Effect::ReleasePointer); }

    fn drain_unmap_notifications(&mut self, windows: &[WindowId]) -> usize {
        let before = self.queued_unmaps.len();
        self.queued_unmaps.retain(|w| !windows.contains(w));
        let drained = before - self.queued_unmaps.len();
        self.record(Effect::DrainUnmaps { windows: windows.to_vec(), drained });
        drained
    }
}

impl DesktopHints for RecordingBackend {
    fn set_active_window(&mut self, window: Option<WindowId>) {
        self.record(Effect::ActiveWindow { window });
    }

    fn set_window_desktop(&mut self, window: WindowId, desktop: Option<usize>) {
        self.record(Effect::WindowDesktop { window, desktop });
    }

    fn set_window_states(&mut self, window: WindowId, states: &[NetState]) {
        self.record(Effect::WindowStates { window, states: states.to_vec() });
    }

    fn set_current_desktop(&mut self, desktop: usize) {
        self.record(Effect::CurrentDesktop { desktop });
    }

    fn set_workarea(&mut self, area: Rect) { self.record(Effect::Workarea { area }); }

    fn register_client(&mut self, window: WindowId) {
        self.record(Effect::RegisterClient { window });
    }

    fn unregister_client(&mut self, window: WindowId) {
        self.record(Effect::UnregisterClient { window });
    }
}

impl StatusSink for RecordingBackend {
    fn redraw_client_state(&mut self, window: WindowId, flags: &ClientFlags) {
        self.record(Effect::ClientIndicator { window, flags: *flags });
    }

    fn redraw_workspace_indicators(&mut self, context: char, workspace: usize) {
        self.record(Effect::WorkspaceIndicators { context, workspace });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_unique() {
        let mut backend = RecordingBackend::new(Rect::new(0, 0, 800, 600));
        let a = backend.create_frame(1, Rect::zero());
        let b = backend.create_frame(2, Rect::zero());
        assert_ne!(a, b);
        assert_eq!(backend.effects().len(), 2);
    }

    #[test]
    fn test_is_mapped_follows_last_effect() {
        let mut backend = RecordingBackend::new(Rect::zero());
        assert!(!backend.is_mapped(5));
        backend.map(5);
        assert!(backend.is_mapped(5));
        backend.unmap(5);
        assert!(!backend.is_mapped(5));
    }

    #[test]
    fn test_drain_only_touches_listed_windows() {
        let mut backend = RecordingBackend::new(Rect::zero());
        backend.unmap(1);
        backend.unmap(2);
        assert_eq!(backend.drain_unmap_notifications(&[1, 3]), 1);
        assert_eq!(backend.drain_unmap_notifications(&[2]), 1);
        assert_eq!(backend.drain_unmap_notifications(&[2]), 0);
    }
}
