//! Collaborator interfaces.
//!
//! The core never talks to the display directly. Every side effect goes
//! through the three traits below, which the consumer calls while draining
//! the change ledger:
//!
//! - [`WindowOps`]: window primitives (frames, mapping, geometry, focus)
//! - [`DesktopHints`]: desktop-integration property publication
//! - [`StatusSink`]: fire-and-forget status indicator redraws
//!
//! [`RecordingBackend`] implements all three in memory and records every call
//! as an [`Effect`].

mod recording;

pub use recording::{Effect, RecordingBackend};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::client::{ClientFlags, SizeHints};
use super::geometry::{Rect, WindowId};

/// ICCCM-style visibility state published on a content window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WmState {
    Normal,
    Iconic,
    Withdrawn,
}

/// Window state atoms understood by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum NetState {
    Fullscreen,
    Above,
    Below,
    Sticky,
    Hidden,
    DemandsAttention,
}

impl NetState {
    /// States implied by a set of client flags, in a fixed order.
    #[must_use]
    pub fn from_flags(flags: &ClientFlags) -> Vec<Self> {
        [
            (flags.fullscreen, Self::Fullscreen),
            (flags.above, Self::Above),
            (flags.below, Self::Below),
            (flags.sticky, Self::Sticky),
            (flags.iconified, Self::Hidden),
            (flags.urgent, Self::DemandsAttention),
        ]
        .into_iter()
        .filter_map(|(set, state)| set.then_some(state))
        .collect()
    }
}

/// What the display reports about a top-level window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowAttributes {
    pub window: WindowId,
    pub geometry: Rect,
    pub class: String,
    pub instance: String,
    pub title: String,
    pub hints: SizeHints,
    /// Window this one is transient for.
    pub transient_for: Option<WindowId>,
    /// The window asked to start fullscreen.
    pub fullscreen: bool,
    /// Fullscreen requests stay inside the window's tile.
    pub in_window_fullscreen: bool,
    /// Never killed by the close command.
    pub invincible: bool,
}

/// Window primitive interface.
pub trait WindowOps {
    /// Geometry of the root window.
    fn screen_geometry(&self) -> Rect;

    /// Takes the window-manager role on the display. Returns `false` when
    /// another window manager already holds it.
    fn claim_display(&mut self) -> bool;

    /// Top-level windows that already exist, for the startup scan.
    fn query_toplevel(&self) -> Vec<WindowAttributes>;

    /// Creates a frame for `window` and reparents the window into it.
    fn create_frame(&mut self, window: WindowId, geometry: Rect) -> WindowId;

    /// Reparents the window back to the root and destroys its frame.
    fn destroy_frame(&mut self, frame: WindowId, window: WindowId);

    fn map(&mut self, window: WindowId);

    fn unmap(&mut self, window: WindowId);

    fn move_resize(&mut self, window: WindowId, geometry: Rect);

    /// Applies a full front-to-back order in one request.
    fn restack(&mut self, windows: &[WindowId]);

    fn set_border(&mut self, window: WindowId, color: u32, width: i32);

    /// Gives input focus to a window, or to the root when `None`.
    fn set_input_focus(&mut self, window: Option<WindowId>);

    /// Grabs click-to-focus buttons on unfocused windows, releases them on the
    /// focused one.
    fn grab_buttons(&mut self, window: WindowId, focused: bool);

    fn set_wm_state(&mut self, window: WindowId, state: WmState);

    /// Asks the client to close itself.
    fn close(&mut self, window: WindowId);

    /// Destroys the client's connection.
    fn kill(&mut self, window: WindowId);

    /// Ends a pointer grab taken for a move/resize interaction.
    fn release_pointer(&mut self);

    /// Discards queued unmap notifications for `windows`, returning how many
    /// were dropped.
    fn drain_unmap_notifications(&mut self, windows: &[WindowId]) -> usize;
}

/// Desktop-hint publication interface.
pub trait DesktopHints {
    fn set_active_window(&mut self, window: Option<WindowId>);

    /// Desktop number of a window; `None` means every desktop.
    fn set_window_desktop(&mut self, window: WindowId, desktop: Option<usize>);

    fn set_window_states(&mut self, window: WindowId, states: &[NetState]);

    fn set_current_desktop(&mut self, desktop: usize);

    /// Publishes the area left for tiling after reserved margins.
    fn set_workarea(&mut self, area: Rect);

    fn register_client(&mut self, window: WindowId);

    fn unregister_client(&mut self, window: WindowId);
}

/// Visual status sink.
pub trait StatusSink {
    fn redraw_client_state(&mut self, window: WindowId, flags: &ClientFlags);

    fn redraw_workspace_indicators(&mut self, context: char, workspace: usize);
}

/// Everything the consumer needs from the outside world.
pub trait Backend: WindowOps + DesktopHints + StatusSink {}

impl<T: WindowOps + DesktopHints + StatusSink> Backend for T {}
