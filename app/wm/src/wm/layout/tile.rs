//! Tile and column layouts.
//!
//! ```text
//! Tile:                 Column:
//! ┌──────────┬─────┐    ┌─────┬─────┬─────┐
//! │    M1    │  2  │    │     │     │  3  │
//! ├──────────┼─────┤    │ M1  │ M2  ├─────┤
//! │    M2    │  3  │    │     │     │  4  │
//! └──────────┴─────┘    └─────┴─────┴─────┘
//! ```
//!
//! Stick shares the tile algorithm; its outer margin is reserved by the
//! caller before the area reaches this module.

use smallvec::SmallVec;

use super::LayoutResult;
use super::helpers::{master_stack_zones, place, split_columns, split_rows};
use crate::wm::geometry::{Rect, WindowId};

/// Parameters shared by the master/stack family of layouts.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub area: Rect,
    pub gap: i32,
    pub nmaster: usize,
    pub mfactor: f64,
    pub mirror: bool,
}

/// Master members in rows on one side, stack members in rows on the other.
#[must_use]
pub fn layout(window_ids: &[WindowId], params: &Params) -> LayoutResult {
    arrange(window_ids, params, split_rows)
}

/// Master members side by side, stack members in rows.
#[must_use]
pub fn layout_column(window_ids: &[WindowId], params: &Params) -> LayoutResult {
    arrange(window_ids, params, split_columns)
}

fn arrange(
    window_ids: &[WindowId],
    params: &Params,
    split_master: fn(&Rect, usize) -> super::helpers::Cells,
) -> LayoutResult {
    let mut result = SmallVec::with_capacity(window_ids.len());
    let zones = master_stack_zones(
        &params.area,
        window_ids.len(),
        params.nmaster,
        params.mfactor,
        params.mirror,
    );
    let (masters, stacked) = window_ids.split_at(zones.masters);

    if let Some(master) = zones.master {
        place(&mut result, masters, &split_master(&master, masters.len()), params.gap);
    }
    if let Some(stack) = zones.stack {
        place(&mut result, stacked, &split_rows(&stack, stacked.len()), params.gap);
    }
    result
}
