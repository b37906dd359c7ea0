//! Center layouts.
//!
//! A column `mfactor` of the area wide is centered horizontally. `Center`
//! gives the whole column to every window, `Centerstack` splits it into one
//! row per window.
//!
//! ```text
//! Center:               Centerstack:
//! ┌───┬──────────┬───┐  ┌───┬──────────┬───┐
//! │   │          │   │  │   │    1     │   │
//! │   │  1,2,3   │   │  │   ├──────────┤   │
//! │   │          │   │  │   │    2     │   │
//! └───┴──────────┴───┘  └───┴──────────┴───┘
//! ```

use smallvec::SmallVec;

use super::LayoutResult;
use super::helpers::{place, split_rows};
use crate::wm::geometry::{Rect, WindowId};

/// Center layout.
///
/// # Arguments
///
/// * `window_ids` - Windows to arrange
/// * `area` - The area the column is centered in
/// * `gap` - Gap around every cell
/// * `mfactor` - Column width as a fraction of the area width
/// * `stacked` - Split the column into rows instead of sharing it
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn layout(
    window_ids: &[WindowId],
    area: &Rect,
    gap: i32,
    mfactor: f64,
    stacked: bool,
) -> LayoutResult {
    let width = ((f64::from(area.width) * mfactor).round() as i32).clamp(1, area.width.max(1));
    let column = Rect::new(0, 0, width, area.height).centered_in(area);

    if stacked {
        let mut result = SmallVec::with_capacity(window_ids.len());
        place(&mut result, window_ids, &split_rows(&column, window_ids.len()), gap);
        result
    } else {
        let cell = column.shrink(gap);
        window_ids.iter().map(|&id| (id, cell)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect { Rect::new(0, 0, 1000, 600) }

    #[test]
    fn test_center_shares_column() {
        let result = layout(&[1, 2], &area(), 0, 0.6, false);
        assert_eq!(result[0].1, Rect::new(200, 0, 600, 600));
        assert_eq!(result[1].1, result[0].1);
    }

    #[test]
    fn test_centerstack_splits_rows() {
        let result = layout(&[1, 2, 3], &area(), 0, 0.5, true);
        assert_eq!(result[0].1, Rect::new(250, 0, 500, 200));
        assert_eq!(result[1].1, Rect::new(250, 200, 500, 200));
        assert_eq!(result[2].1, Rect::new(250, 400, 500, 200));
    }

    #[test]
    fn test_center_respects_area_offset() {
        let offset = Rect::new(100, 50, 1000, 600);
        let result = layout(&[1], &offset, 0, 0.5, false);
        assert_eq!(result[0].1, Rect::new(350, 50, 500, 600));
    }
}
