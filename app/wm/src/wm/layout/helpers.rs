//! Helper functions for layout calculations.
//!
//! Splits always hand the rounding remainder to the last member, so the
//! members of a zone tile it exactly.

use smallvec::SmallVec;

use super::LayoutResult;
use crate::wm::geometry::{Rect, WindowId};

/// Cells produced by a split. Inline for the common case of a few members.
pub type Cells = SmallVec<[Rect; 8]>;

/// Splits a length into `count` parts; the last part absorbs the remainder.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn split_length(total: i32, count: usize) -> SmallVec<[i32; 8]> {
    let mut parts = SmallVec::new();
    if count == 0 {
        return parts;
    }
    let n = count as i32;
    let base = total / n;
    for _ in 0..count - 1 {
        parts.push(base);
    }
    parts.push(total - base * (n - 1));
    parts
}

/// Splits a frame into `count` rows stacked top to bottom.
#[must_use]
pub fn split_rows(frame: &Rect, count: usize) -> Cells {
    let mut y = frame.y;
    split_length(frame.height, count)
        .into_iter()
        .map(|height| {
            let cell = Rect::new(frame.x, y, frame.width, height);
            y += height;
            cell
        })
        .collect()
}

/// Splits a frame into `count` columns laid out left to right.
#[must_use]
pub fn split_columns(frame: &Rect, count: usize) -> Cells {
    let mut x = frame.x;
    split_length(frame.width, count)
        .into_iter()
        .map(|width| {
            let cell = Rect::new(x, frame.y, width, frame.height);
            x += width;
            cell
        })
        .collect()
}

/// Splits a frame horizontally (left/right) at the given ratio.
///
/// # Returns
///
/// A tuple of (`left_frame`, `right_frame`)
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn split_horizontal(frame: &Rect, ratio: f64) -> (Rect, Rect) {
    let max_width = (frame.width - 1).max(1);
    let left_width = ((f64::from(frame.width) * ratio).round() as i32).clamp(1, max_width);
    let left = Rect::new(frame.x, frame.y, left_width, frame.height);
    let right = Rect::new(frame.x + left_width, frame.y, frame.width - left_width, frame.height);
    (left, right)
}

/// Splits a frame vertically (top/bottom) at the given ratio.
///
/// # Returns
///
/// A tuple of (`top_frame`, `bottom_frame`)
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn split_vertical(frame: &Rect, ratio: f64) -> (Rect, Rect) {
    let max_height = (frame.height - 1).max(1);
    let top_height = ((f64::from(frame.height) * ratio).round() as i32).clamp(1, max_height);
    let top = Rect::new(frame.x, frame.y, frame.width, top_height);
    let bottom = Rect::new(frame.x, frame.y + top_height, frame.width, frame.height - top_height);
    (top, bottom)
}

/// Pairs each id with its cell, shrinking every cell by `gap`.
pub fn place(result: &mut LayoutResult, window_ids: &[WindowId], cells: &[Rect], gap: i32) {
    for (&id, cell) in window_ids.iter().zip(cells) {
        result.push((id, cell.shrink(gap)));
    }
}

/// Gives every id the same cell.
pub fn place_shared(result: &mut LayoutResult, window_ids: &[WindowId], cell: Rect) {
    result.extend(window_ids.iter().map(|&id| (id, cell)));
}

/// The master and stack zones of a master/stack layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zones {
    /// Number of members in the master zone.
    pub masters: usize,
    pub master: Option<Rect>,
    pub stack: Option<Rect>,
}

/// Divides a frame into a master column (sized by `mfactor`) and a stack
/// column holding the rest. An empty zone gets no area at all.
#[must_use]
pub fn master_stack_zones(
    frame: &Rect,
    count: usize,
    nmaster: usize,
    mfactor: f64,
    mirror: bool,
) -> Zones {
    let masters = nmaster.min(count);
    let stacked = count - masters;

    let (master, stack) = match (masters, stacked) {
        (0, 0) => (None, None),
        (0, _) => (None, Some(*frame)),
        (_, 0) => (Some(*frame), None),
        _ if mirror => {
            let (left, right) = split_horizontal(frame, 1.0 - mfactor);
            (Some(right), Some(left))
        }
        _ => {
            let (left, right) = split_horizontal(frame, mfactor);
            (Some(left), Some(right))
        }
    };

    Zones { masters, master, stack }
}
