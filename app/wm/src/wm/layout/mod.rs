//! Layout algorithms for the tiling window manager.
//!
//! Every layout is a pure function from an ordered list of tileable windows
//! and a [`LayoutRequest`] to the frame each window should occupy. Nothing in
//! this module touches the display; the registry applies the results.
//!
//! # Gaps
//!
//! Every cell a mode produces is shrunk by the gap on all four sides, so two
//! neighbouring windows are separated by twice the gap and the cells, grown
//! back by the gap, tile the usable area exactly. The last member of every
//! split absorbs the rounding remainder.
//!
//! # Supported Layouts
//!
//! - **Floating**: no tiling, windows keep their floating geometry
//! - **Tile**: master column plus a stack column
//! - **Stick**: tile with an outer margin as wide as the inner gutters
//! - **Deck / Doubledeck**: stack (and master) members share one cell
//! - **Sdeck / Sdoubledeck**: decks without a gap around the shared cell
//! - **Grid**: binary space partition alternating the split axis
//! - **Pillar**: master column flanked by two stacks
//! - **Column**: masters side by side, stack in rows
//! - **Monocle**: every window gets the whole area
//! - **Center / Centerstack**: a centered column, shared or split in rows

mod center;
mod deck;
mod grid;
mod helpers;
mod monocle;
mod pillar;
mod tile;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::wm::geometry::{Rect, WindowId};

// ============================================================================
// Layout Mode
// ============================================================================

/// Tiling discipline of a workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Windows are never repositioned.
    Floating,
    /// Master column with a stack column beside it.
    #[default]
    Tile,
    /// Tile with symmetric inner and outer gutters.
    Stick,
    /// Master rows with every stack member in one shared cell.
    Deck,
    /// Shared cell for masters and for stack members.
    Doubledeck,
    /// Deck whose shared cell ignores the gap.
    Sdeck,
    /// Doubledeck whose shared cells ignore the gap.
    Sdoubledeck,
    /// Recursive halving, alternating the split axis.
    Grid,
    /// Master column between a left and a right stack.
    Pillar,
    /// Masters side by side, stack members in rows.
    Column,
    /// Every window fills the area.
    Monocle,
    /// One centered column shared by every window.
    Center,
    /// One centered column split into rows.
    Centerstack,
}

impl LayoutMode {
    /// All modes in cycling order.
    pub const ALL: [Self; 13] = [
        Self::Floating,
        Self::Tile,
        Self::Stick,
        Self::Deck,
        Self::Doubledeck,
        Self::Sdeck,
        Self::Sdoubledeck,
        Self::Grid,
        Self::Pillar,
        Self::Column,
        Self::Monocle,
        Self::Center,
        Self::Centerstack,
    ];

    /// Whether the mode treats floating clients like tiled ones when
    /// restacking. Under the floating layout every client floats, so the
    /// distinction carries no information.
    #[must_use]
    pub const fn ignores_floating(self) -> bool { matches!(self, Self::Floating) }

    /// Whether the mode positions any window at all.
    #[must_use]
    pub const fn is_tiling(self) -> bool { !matches!(self, Self::Floating) }

    /// Short lowercase name, as used in configuration and on the CLI.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Floating => "floating",
            Self::Tile => "tile",
            Self::Stick => "stick",
            Self::Deck => "deck",
            Self::Doubledeck => "doubledeck",
            Self::Sdeck => "sdeck",
            Self::Sdoubledeck => "sdoubledeck",
            Self::Grid => "grid",
            Self::Pillar => "pillar",
            Self::Column => "column",
            Self::Monocle => "monocle",
            Self::Center => "center",
            Self::Centerstack => "centerstack",
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

impl std::str::FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layout mode '{s}'"))
    }
}

// ============================================================================
// Layout Request / Result
// ============================================================================

/// Inline capacity for layout results.
pub const LAYOUT_INLINE_CAP: usize = 16;

/// Result of a layout calculation: `(window, frame)` pairs in input order.
pub type LayoutResult = SmallVec<[(WindowId, Rect); LAYOUT_INLINE_CAP]>;

/// Parameters of a single layout calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRequest {
    pub mode: LayoutMode,
    /// Area to tile.
    pub screen: Rect,
    /// Gap in pixels around every cell.
    pub gap: i32,
    /// Number of windows in the master zone.
    pub nmaster: usize,
    /// Fraction of the width given to the master zone.
    pub mfactor: f64,
    /// Swap master and stack horizontally.
    pub mirror: bool,
}

impl LayoutRequest {
    /// Creates a request with the usual defaults (one master, half the width,
    /// no gap).
    #[must_use]
    pub const fn new(mode: LayoutMode, screen: Rect) -> Self {
        Self {
            mode,
            screen,
            gap: 0,
            nmaster: 1,
            mfactor: 0.5,
            mirror: false,
        }
    }

    #[must_use]
    pub const fn with_gap(mut self, gap: i32) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub const fn with_nmaster(mut self, nmaster: usize) -> Self {
        self.nmaster = nmaster;
        self
    }

    #[must_use]
    pub const fn with_mfactor(mut self, mfactor: f64) -> Self {
        self.mfactor = mfactor;
        self
    }

    #[must_use]
    pub const fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// The area the cells of this request tile, before the per-cell gap.
    #[must_use]
    pub fn usable_area(&self) -> Rect {
        match self.mode {
            LayoutMode::Stick => self.screen.shrink(self.gap.max(0)),
            _ => self.screen,
        }
    }
}

// ============================================================================
// Main Layout Function
// ============================================================================

/// Calculates window frames for the requested layout.
///
/// # Arguments
///
/// * `window_ids` - Tileable windows to arrange, in tiling order
/// * `request` - Mode, area and layout parameters
///
/// # Returns
///
/// One `(window, frame)` pair per window, or nothing for the floating mode.
#[must_use]
pub fn calculate_layout(window_ids: &[WindowId], request: &LayoutRequest) -> LayoutResult {
    if window_ids.is_empty() || !request.screen.is_valid() {
        return SmallVec::new();
    }

    let area = request.usable_area();
    let gap = request.gap.max(0);
    let mfactor = request.mfactor.clamp(0.05, 0.95);
    let params = tile::Params {
        area,
        gap,
        nmaster: request.nmaster,
        mfactor,
        mirror: request.mirror,
    };

    match request.mode {
        LayoutMode::Floating => SmallVec::new(),
        LayoutMode::Tile | LayoutMode::Stick => tile::layout(window_ids, &params),
        LayoutMode::Column => tile::layout_column(window_ids, &params),
        LayoutMode::Deck => deck::layout(window_ids, &params, deck::Variant::STACK),
        LayoutMode::Doubledeck => deck::layout(window_ids, &params, deck::Variant::BOTH),
        LayoutMode::Sdeck => deck::layout(window_ids, &params, deck::Variant::STACK.raw()),
        LayoutMode::Sdoubledeck => deck::layout(window_ids, &params, deck::Variant::BOTH.raw()),
        LayoutMode::Grid => grid::layout(window_ids, &area, gap),
        LayoutMode::Pillar => pillar::layout(window_ids, &params),
        LayoutMode::Monocle => monocle::layout(window_ids, &area, gap),
        LayoutMode::Center => center::layout(window_ids, &area, gap, mfactor, false),
        LayoutMode::Centerstack => center::layout(window_ids, &area, gap, mfactor, true),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect { Rect::new(0, 0, 1920, 1080) }

    /// Distinct cells grown back by the gap, sorted for comparison.
    fn expanded_cells(result: &LayoutResult, gap: i32) -> Vec<Rect> {
        let mut cells: Vec<Rect> = result.iter().map(|(_, rect)| rect.expand(gap)).collect();
        cells.sort_by_key(|r| (r.x, r.y, r.width, r.height));
        cells.dedup();
        cells
    }

    fn assert_tiles_exactly(cells: &[Rect], area: &Rect) {
        let total: i64 = cells.iter().map(Rect::area).sum();
        assert_eq!(total, area.area(), "cells {cells:?} do not cover {area}");
        for (i, a) in cells.iter().enumerate() {
            assert!(a.x >= area.x && a.right() <= area.right(), "{a} leaves {area}");
            assert!(a.y >= area.y && a.bottom() <= area.bottom(), "{a} leaves {area}");
            for b in &cells[i + 1..] {
                assert!(!a.intersects(b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn test_calculate_layout_empty() {
        let request = LayoutRequest::new(LayoutMode::Tile, screen());
        assert!(calculate_layout(&[], &request).is_empty());
    }

    #[test]
    fn test_calculate_layout_routes_every_mode() {
        let windows = [1, 2, 3];
        for mode in LayoutMode::ALL {
            let request = LayoutRequest::new(mode, screen()).with_gap(4);
            let result = calculate_layout(&windows, &request);
            if mode == LayoutMode::Floating {
                assert!(result.is_empty());
            } else {
                assert_eq!(result.len(), 3, "layout {mode} should place every window");
                let ids: Vec<_> = result.iter().map(|(id, _)| *id).collect();
                assert_eq!(ids, windows, "layout {mode} should keep input order");
            }
        }
    }

    #[test]
    fn test_area_conservation() {
        let screens = [screen(), Rect::new(17, 33, 1001, 767)];
        let modes = [
            LayoutMode::Tile,
            LayoutMode::Stick,
            LayoutMode::Deck,
            LayoutMode::Doubledeck,
            LayoutMode::Column,
            LayoutMode::Pillar,
            LayoutMode::Grid,
        ];

        for screen in screens {
            for mode in modes {
                for count in 1..=9_u32 {
                    let ids: Vec<u32> = (1..=count).collect();
                    let n = count as usize;
                    for nmaster in [0, 1, n, n / 2] {
                        for gap in [0, 5] {
                            for mirror in [false, true] {
                                let request = LayoutRequest::new(mode, screen)
                                    .with_gap(gap)
                                    .with_nmaster(nmaster)
                                    .with_mfactor(0.6)
                                    .with_mirror(mirror);
                                let result = calculate_layout(&ids, &request);
                                assert_eq!(result.len(), n);
                                let cells = expanded_cells(&result, gap);
                                assert_tiles_exactly(&cells, &request.usable_area());
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_stick_reserves_outer_margin() {
        let request = LayoutRequest::new(LayoutMode::Stick, screen()).with_gap(10);
        let result = calculate_layout(&[1], &request);
        // 10px margin plus 10px cell gap
        assert_eq!(result[0].1, Rect::new(20, 20, 1880, 1040));
    }

    #[test]
    fn test_mfactor_is_clamped() {
        let request = LayoutRequest::new(LayoutMode::Tile, screen()).with_mfactor(2.0);
        let result = calculate_layout(&[1, 2], &request);
        let master = result[0].1;
        assert_eq!(master.width, 1824); // 0.95 of 1920
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("sdeck".parse::<LayoutMode>(), Ok(LayoutMode::Sdeck));
        assert_eq!("Monocle".parse::<LayoutMode>(), Ok(LayoutMode::Monocle));
        assert!("spiral".parse::<LayoutMode>().is_err());
        for mode in LayoutMode::ALL {
            assert_eq!(mode.to_string().parse::<LayoutMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_mode_serde_is_kebab_case() {
        let json = serde_json::to_string(&LayoutMode::Centerstack).unwrap();
        assert_eq!(json, "\"centerstack\"");
        let mode: LayoutMode = serde_json::from_str("\"doubledeck\"").unwrap();
        assert_eq!(mode, LayoutMode::Doubledeck);
    }
}
