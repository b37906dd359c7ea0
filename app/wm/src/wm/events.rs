//! Inbound events and commands.
//!
//! Protocol events come from the display transport; commands come from key
//! bindings or the IPC channel. Both are plain serde types so a session can
//! be recorded and replayed as JSON lines.

use serde::{Deserialize, Serialize};

use super::backend::{NetState, WindowAttributes};
use super::cycle::Direction;
use super::geometry::{Rect, WindowId};
use super::layout::LayoutMode;
use super::registry::{InteractionKind, ToggleAction};
use super::stack::Layer;

// ============================================================================
// Protocol events
// ============================================================================

/// Event reported by the display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ProtocolEvent {
    /// A top-level window asked to be shown.
    MapRequest { attributes: WindowAttributes },
    DestroyNotify { window: WindowId },
    UnmapNotify { window: WindowId },
    /// A window asked for a new geometry.
    ConfigureRequest { window: WindowId, geometry: Rect },
    /// The pointer entered a window.
    EnterNotify { window: WindowId },
    /// A button went down on a window. `action` is the interaction bound to
    /// the button, if any.
    ButtonPress {
        window: WindowId,
        #[serde(default)]
        action: Option<InteractionKind>,
        x: i32,
        y: i32,
    },
    MotionNotify { x: i32, y: i32 },
    ButtonRelease,
    /// A client asked to change one of its window states.
    StateRequest {
        window: WindowId,
        state: NetState,
        action: ToggleAction,
    },
    /// A pager or task bar asked to activate a window.
    ActivateRequest { window: WindowId },
    UrgencyHint { window: WindowId, urgent: bool },
    /// An unmanaged window (panel, desktop, notification) appeared in a
    /// stacking layer.
    LayerWindow {
        window: WindowId,
        layer: Layer,
        #[serde(default)]
        geometry: Rect,
    },
    LayerWindowGone { window: WindowId },
}

impl ProtocolEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MapRequest { .. } => "mapRequest",
            Self::DestroyNotify { .. } => "destroyNotify",
            Self::UnmapNotify { .. } => "unmapNotify",
            Self::ConfigureRequest { .. } => "configureRequest",
            Self::EnterNotify { .. } => "enterNotify",
            Self::ButtonPress { .. } => "buttonPress",
            Self::MotionNotify { .. } => "motionNotify",
            Self::ButtonRelease => "buttonRelease",
            Self::StateRequest { .. } => "stateRequest",
            Self::ActivateRequest { .. } => "activateRequest",
            Self::UrgencyHint { .. } => "urgencyHint",
            Self::LayerWindow { .. } => "layerWindow",
            Self::LayerWindowGone { .. } => "layerWindowGone",
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// User command. Workspace numbers are one-based, as typed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    FocusNext,
    FocusPrev,
    FocusIndex { index: usize },
    SwapNext,
    SwapPrev,
    Workspace { index: usize },
    Context { letter: char },
    ToggleWorkspace,
    ToggleContext,
    NextWorkspace,
    PrevWorkspace,
    SendToWorkspace { index: usize },
    SendToContext { letter: char },
    SetLayout { mode: LayoutMode },
    ToggleLayout,
    AdjustNmaster { delta: i32 },
    AdjustMfactor { delta: f64 },
    AdjustGap { delta: i32 },
    ToggleMirror,
    ToggleSidebar,
    ResetLayout,
    RotateMaster { direction: Direction },
    RotateStack { direction: Direction },
    RotateClients { direction: Direction },
    Zoom,
    JumpPane,
    Fullscreen,
    Above,
    Below,
    Sticky,
    Iconify,
    Disown,
    /// Restores the most recently iconified client.
    Deiconify,
    Mark,
    JumpMarked,
    JumpProcess { name: String },
    /// Politely closes the focused client.
    Close,
    /// Launches a shell command line.
    Spawn { shell: String },
}

// ============================================================================
// Replay input
// ============================================================================

/// One line of a replay file: either an event or a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Input {
    Event(ProtocolEvent),
    Command(Command),
}
