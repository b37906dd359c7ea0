//! Grid layout - recursive binary space partition.
//!
//! The area is halved repeatedly, alternating between a side-by-side and a
//! top-bottom split. The first half receives `n / 2` windows and a share of
//! the area proportional to that count, so every window ends up with roughly
//! the same amount of space.
//!
//! ```text
//! 3 windows:        5 windows:
//! ┌─────┬─────┐     ┌─────┬─────┐
//! │     │  2  │     │  1  │  3  │
//! │  1  ├─────┤     ├─────┼──┬──┤
//! │     │  3  │     │  2  │4 │5 │
//! └─────┴─────┘     └─────┴──┴──┘
//! ```

use smallvec::SmallVec;

use super::LayoutResult;
use super::helpers::{split_horizontal, split_vertical};
use crate::wm::geometry::{Rect, WindowId};

/// Grid layout.
///
/// # Arguments
///
/// * `window_ids` - Windows to arrange
/// * `area` - The area to partition
/// * `gap` - Gap around every cell
#[allow(clippy::cast_precision_loss)] // Window counts fit f64
#[must_use]
pub fn layout(window_ids: &[WindowId], area: &Rect, gap: i32) -> LayoutResult {
    let mut result = SmallVec::with_capacity(window_ids.len());

    // Explicit work list instead of recursion; ids are emitted in input order
    // because the first half is always processed first.
    let mut pending: SmallVec<[(&[WindowId], Rect, bool); 8]> = SmallVec::new();
    pending.push((window_ids, *area, true));

    while let Some((ids, frame, side_by_side)) = pending.pop() {
        match ids.len() {
            0 => {}
            1 => result.push((ids[0], frame.shrink(gap))),
            n => {
                let first = n / 2;
                let ratio = first as f64 / n as f64;
                let (a, b) = if side_by_side {
                    split_horizontal(&frame, ratio)
                } else {
                    split_vertical(&frame, ratio)
                };
                let (head, tail) = ids.split_at(first);
                pending.push((tail, b, !side_by_side));
                pending.push((head, a, !side_by_side));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_windows_side_by_side() {
        let result = layout(&[1, 2], &Rect::new(0, 0, 1000, 600), 0);
        assert_eq!(result[0], (1, Rect::new(0, 0, 500, 600)));
        assert_eq!(result[1], (2, Rect::new(500, 0, 500, 600)));
    }

    #[test]
    fn test_three_windows() {
        let result = layout(&[1, 2, 3], &Rect::new(0, 0, 900, 600), 0);
        assert_eq!(result[0], (1, Rect::new(0, 0, 300, 600)));
        assert_eq!(result[1], (2, Rect::new(300, 0, 600, 300)));
        assert_eq!(result[2], (3, Rect::new(300, 300, 600, 300)));
    }

    #[test]
    fn test_four_windows_form_quadrants() {
        let result = layout(&[1, 2, 3, 4], &Rect::new(0, 0, 1000, 600), 0);
        let rects: Vec<_> = result.iter().map(|(_, r)| *r).collect();
        assert_eq!(
            rects,
            vec![
                Rect::new(0, 0, 500, 300),
                Rect::new(0, 300, 500, 300),
                Rect::new(500, 0, 500, 300),
                Rect::new(500, 300, 500, 300),
            ]
        );
    }

    #[test]
    fn test_keeps_input_order() {
        let ids: Vec<u32> = (10..17).collect();
        let result = layout(&ids, &Rect::new(0, 0, 1920, 1080), 2);
        let out: Vec<u32> = result.iter().map(|(id, _)| *id).collect();
        assert_eq!(out, ids);
    }
}
