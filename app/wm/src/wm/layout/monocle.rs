//! Monocle layout - all windows maximized to fill the area.

use super::LayoutResult;
use crate::wm::geometry::{Rect, WindowId};

/// Monocle layout.
///
/// Every window gets the full area minus the gap. Only the focused window is
/// visible; rotations are disabled in this mode.
///
/// # Arguments
///
/// * `window_ids` - IDs of windows to arrange
/// * `area` - The area to fill
/// * `gap` - Gap around the shared cell
#[must_use]
pub fn layout(window_ids: &[WindowId], area: &Rect, gap: i32) -> LayoutResult {
    let cell = area.shrink(gap);
    window_ids.iter().map(|&id| (id, cell)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect { Rect::new(0, 0, 1920, 1080) }

    #[test]
    fn test_monocle_empty() {
        assert!(layout(&[], &area(), 0).is_empty());
    }

    #[test]
    fn test_monocle_multiple_windows() {
        let result = layout(&[5, 3, 8], &area(), 0);
        assert_eq!(result.len(), 3);
        for (id, frame) in &result {
            assert_eq!(*frame, area(), "window {id} should fill the area");
        }
        assert_eq!(result[0].0, 5);
        assert_eq!(result[2].0, 8);
    }

    #[test]
    fn test_monocle_applies_gap() {
        let result = layout(&[1], &area(), 8);
        assert_eq!(result[0].1, Rect::new(8, 8, 1904, 1064));
    }
}
