//! Managed clients.
//!
//! A [`Client`] is one top-level protocol window plus the frame it was
//! reparented into. Clients live in a `SlotMap` owned by the registry and are
//! addressed by generation-checked [`ClientId`] keys, so a stale id held by a
//! ledger record can never reach a recycled slot.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use super::geometry::{Rect, WindowId};

new_key_type! {
    /// Stable, generation-checked handle of a managed client.
    pub struct ClientId;
}

// ============================================================================
// Size Hints
// ============================================================================

/// Size constraints advertised by the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SizeHints {
    /// Base size (width, height) subtracted before applying increments.
    pub base: (i32, i32),
    /// Resize increments (width, height). Zero disables stepping.
    pub increment: (i32, i32),
    /// Minimum size.
    pub min: (i32, i32),
    /// Maximum size, if bounded.
    pub max: Option<(i32, i32)>,
    /// Allowed aspect ratio range (min, max) as width / height.
    pub aspect: Option<(f64, f64)>,
}

impl SizeHints {
    /// Constrains a requested size to these hints.
    #[allow(clippy::cast_possible_truncation)] // Pixel sizes fit in i32
    #[must_use]
    pub fn constrain(&self, width: i32, height: i32) -> (i32, i32) {
        let (base_w, base_h) = self.base;
        let mut w = width.max(1);
        let mut h = height.max(1);

        if let Some((min_aspect, max_aspect)) = self.aspect {
            let aw = f64::from((w - base_w).max(1));
            let ah = f64::from((h - base_h).max(1));
            if max_aspect > 0.0 && aw / ah > max_aspect {
                w = (ah * max_aspect).round() as i32 + base_w;
            } else if min_aspect > 0.0 && aw / ah < min_aspect {
                h = (aw / min_aspect).round() as i32 + base_h;
            }
        }

        let (inc_w, inc_h) = self.increment;
        if inc_w > 0 && w > base_w {
            w -= (w - base_w) % inc_w;
        }
        if inc_h > 0 && h > base_h {
            h -= (h - base_h) % inc_h;
        }

        w = w.max(self.min.0).max(1);
        h = h.max(self.min.1).max(1);
        if let Some((max_w, max_h)) = self.max {
            if max_w > 0 {
                w = w.min(max_w);
            }
            if max_h > 0 {
                h = h.min(max_h);
            }
        }

        (w, h)
    }
}

// ============================================================================
// Flags
// ============================================================================

/// Boolean state of a client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)] // Client state naturally has many boolean flags
pub struct ClientFlags {
    pub floating: bool,
    pub fullscreen: bool,
    pub above: bool,
    pub below: bool,
    pub urgent: bool,
    pub iconified: bool,
    pub disowned: bool,
    pub sticky: bool,
    /// Never killed by the close command.
    pub invincible: bool,
    /// Fullscreen confined to the client's own tile.
    pub in_window_fullscreen: bool,
}

/// Protocol event the manager expects as the echo of its own request.
///
/// Set before mapping/unmapping a window so the resulting notification is
/// not mistaken for a client-initiated transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectedEvent {
    Map,
    Unmap,
}

// ============================================================================
// Client
// ============================================================================

/// A managed top-level window.
#[derive(Clone, Debug, PartialEq)]
pub struct Client {
    /// Content window.
    pub window: WindowId,
    /// Frame the content window is reparented into.
    pub frame: WindowId,
    /// Current (tiled or applied) geometry of the frame.
    pub geometry: Rect,
    /// Geometry used whenever the client is floating.
    pub float_geometry: Rect,
    pub hints: SizeHints,
    pub flags: ClientFlags,
    pub expect: Option<ExpectedEvent>,
    /// Owning client for transient windows.
    pub parent: Option<ClientId>,
    /// Transient children.
    pub children: Vec<ClientId>,
    pub class: String,
    pub instance: String,
    pub title: String,
    /// Close as soon as the client has been placed.
    pub autoclose: bool,
}

impl Client {
    /// Creates a client for a window already reparented into `frame`.
    #[must_use]
    pub fn new(window: WindowId, frame: WindowId, geometry: Rect) -> Self {
        Self {
            window,
            frame,
            geometry,
            float_geometry: geometry,
            hints: SizeHints::default(),
            flags: ClientFlags::default(),
            expect: None,
            parent: None,
            children: Vec::new(),
            class: String::new(),
            instance: String::new(),
            title: String::new(),
            autoclose: false,
        }
    }

    /// Sets the class, instance and title strings.
    #[must_use]
    pub fn with_names(
        mut self,
        class: impl Into<String>,
        instance: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        self.class = class.into();
        self.instance = instance.into();
        self.title = title.into();
        self
    }

    /// Whether the client covers the whole screen rather than its tile.
    #[must_use]
    pub const fn is_out_of_window_fullscreen(&self) -> bool {
        self.flags.fullscreen && !self.flags.in_window_fullscreen
    }

    /// Whether the layout engine may position this client.
    #[must_use]
    pub const fn is_tileable(&self) -> bool {
        self.parent.is_none()
            && !self.flags.floating
            && !self.flags.iconified
            && !self.flags.disowned
            && !self.is_out_of_window_fullscreen()
    }

    /// Whether the client belongs to the named process (class or instance,
    /// case-insensitive).
    #[must_use]
    pub fn matches_process(&self, name: &str) -> bool {
        self.class.eq_ignore_ascii_case(name) || self.instance.eq_ignore_ascii_case(name)
    }
}

// ============================================================================
// Tests
// ============================================================================
