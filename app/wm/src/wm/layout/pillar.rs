//! Pillar layout - master column flanked by two stacks.
//!
//! ```text
//! ┌─────┬──────────┬─────┐
//! │  2  │          │  4  │
//! ├─────┤    M1    ├─────┤
//! │  3  │          │  5  │
//! └─────┴──────────┴─────┘
//! ```
//!
//! The left stack takes the larger half of the stack members. Mirroring
//! swaps the two stacks. A single stack member has nothing to flank with,
//! so that case falls back to the tile layout.

use smallvec::SmallVec;

use super::LayoutResult;
use super::helpers::{place, split_columns, split_horizontal, split_rows};
use super::tile::{self, Params};
use crate::wm::geometry::WindowId;

/// Pillar layout.
#[must_use]
pub fn layout(window_ids: &[WindowId], params: &Params) -> LayoutResult {
    let masters = params.nmaster.min(window_ids.len());
    let stacked = window_ids.len() - masters;
    if masters == 0 && stacked >= 2 {
        return flanks_only(window_ids, params);
    }
    if masters == 0 || stacked < 2 {
        return tile::layout(window_ids, params);
    }

    let (master_ids, stack_ids) = window_ids.split_at(masters);
    let (first_ids, second_ids) = stack_ids.split_at(stacked.div_ceil(2));
    let (left_ids, right_ids) =
        if params.mirror { (second_ids, first_ids) } else { (first_ids, second_ids) };

    let side_ratio = (1.0 - params.mfactor) / 2.0;
    let (left, rest) = split_horizontal(&params.area, side_ratio);
    let (middle, right) = split_horizontal(&rest, params.mfactor / (1.0 - side_ratio));

    let mut result = SmallVec::with_capacity(window_ids.len());
    place(&mut result, master_ids, &split_rows(&middle, masters), params.gap);

    // Results follow input order: first stack half, then second
    let mut left_cells = split_rows(&left, left_ids.len());
    let mut right_cells = split_rows(&right, right_ids.len());
    if params.mirror {
        std::mem::swap(&mut left_cells, &mut right_cells);
    }
    place(&mut result, first_ids, &left_cells, params.gap);
    place(&mut result, second_ids, &right_cells, params.gap);
    result
}

/// No masters: the stack members are split between two equal halves.
fn flanks_only(window_ids: &[WindowId], params: &Params) -> LayoutResult {
    let (first_ids, second_ids) = window_ids.split_at(window_ids.len().div_ceil(2));
    let halves = split_columns(&params.area, 2);
    let (left, right) = if params.mirror { (halves[1], halves[0]) } else { (halves[0], halves[1]) };

    let mut result = SmallVec::with_capacity(window_ids.len());
    place(&mut result, first_ids, &split_rows(&left, first_ids.len()), params.gap);
    place(&mut result, second_ids, &split_rows(&right, second_ids.len()), params.gap);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::geometry::Rect;

    fn params() -> Params {
        Params {
            area: Rect::new(0, 0, 1000, 600),
            gap: 0,
            nmaster: 1,
            mfactor: 0.5,
            mirror: false,
        }
    }

    #[test]
    fn test_master_in_the_middle() {
        let result = layout(&[1, 2, 3, 4, 5], &params());
        assert_eq!(result[0], (1, Rect::new(250, 0, 500, 600)));
        assert_eq!(result[1], (2, Rect::new(0, 0, 250, 300)));
        assert_eq!(result[2], (3, Rect::new(0, 300, 250, 300)));
        assert_eq!(result[3], (4, Rect::new(750, 0, 250, 300)));
        assert_eq!(result[4], (5, Rect::new(750, 300, 250, 300)));
    }

    #[test]
    fn test_left_takes_larger_half() {
        let result = layout(&[1, 2, 3, 4], &params());
        assert_eq!(result[1].1, Rect::new(0, 0, 250, 300));
        assert_eq!(result[2].1, Rect::new(0, 300, 250, 300));
        assert_eq!(result[3].1, Rect::new(750, 0, 250, 600));
    }

    #[test]
    fn test_mirror_swaps_stacks() {
        let p = Params { mirror: true, ..params() };
        let result = layout(&[1, 2, 3, 4], &p);
        assert_eq!(result[0].1, Rect::new(250, 0, 500, 600));
        assert_eq!(result[1].1, Rect::new(750, 0, 250, 300));
        assert_eq!(result[2].1, Rect::new(750, 300, 250, 300));
        assert_eq!(result[3].1, Rect::new(0, 0, 250, 600));
    }

    #[test]
    fn test_single_stack_member_falls_back_to_tile() {
        assert_eq!(layout(&[1, 2], &params()), tile::layout(&[1, 2], &params()));
    }

    #[test]
    fn test_no_master_splits_halves() {
        let p = Params { nmaster: 0, ..params() };
        let result = layout(&[1, 2, 3], &p);
        assert_eq!(result[0].1, Rect::new(0, 0, 500, 300));
        assert_eq!(result[1].1, Rect::new(0, 300, 500, 300));
        assert_eq!(result[2].1, Rect::new(500, 0, 500, 600));
    }
}
