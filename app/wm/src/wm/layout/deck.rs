//! Deck layouts.
//!
//! A deck keeps every member of a zone in one shared cell; only the front
//! member is visible. `Deck` decks the stack, `Doubledeck` decks both zones.
//! The raw (`s`-prefixed) variants hand the deck the zone rectangle itself,
//! without the gap.

use smallvec::SmallVec;

use super::LayoutResult;
use super::helpers::{master_stack_zones, place, place_shared, split_rows};
use super::tile::Params;
use crate::wm::geometry::{Rect, WindowId};

/// Which zones are decked, and whether decks get the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub master: bool,
    pub raw: bool,
}

impl Variant {
    /// Only the stack is decked.
    pub const STACK: Self = Self { master: false, raw: false };
    /// Both zones are decked.
    pub const BOTH: Self = Self { master: true, raw: false };

    /// Same variant with gapless decks.
    #[must_use]
    pub const fn raw(self) -> Self { Self { raw: true, ..self } }
}

/// Deck layout.
#[must_use]
pub fn layout(window_ids: &[WindowId], params: &Params, variant: Variant) -> LayoutResult {
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
        if variant.master {
            place_shared(&mut result, masters, deck_cell(master, params.gap, variant));
        } else {
            place(&mut result, masters, &split_rows(&master, masters.len()), params.gap);
        }
    }
    if let Some(stack) = zones.stack {
        place_shared(&mut result, stacked, deck_cell(stack, params.gap, variant));
    }
    result
}

fn deck_cell(zone: Rect, gap: i32, variant: Variant) -> Rect {
    if variant.raw { zone } else { zone.shrink(gap) }
}
