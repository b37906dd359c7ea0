//! Geometry primitives shared by the layout engine, the window stack and the
//! registry.
//!
//! All coordinates are integral pixels, matching the windowing protocol.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Opaque handle of a protocol window (content window or frame).
pub type WindowId = u32;

// ============================================================================
// Rect
// ============================================================================

/// A rectangle with position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0, 0, 0, 0) }

    /// Check if this rectangle has valid dimensions.
    #[must_use]
    pub const fn is_valid(&self) -> bool { self.width > 0 && self.height > 0 }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> i32 { self.x + self.width }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 { self.y + self.height }

    /// Check if this rectangle contains a point.
    #[must_use]
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rectangle overlaps another (shared edges do not count).
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Calculate the area of this rectangle.
    #[must_use]
    pub fn area(&self) -> i64 { i64::from(self.width) * i64::from(self.height) }

    /// Shrinks the rectangle by `by` pixels on every side.
    ///
    /// Width and height never drop below one pixel.
    #[must_use]
    pub fn shrink(&self, by: i32) -> Self {
        Self {
            x: self.x + by,
            y: self.y + by,
            width: (self.width - 2 * by).max(1),
            height: (self.height - 2 * by).max(1),
        }
    }

    /// Grows the rectangle by `by` pixels on every side.
    #[must_use]
    pub const fn expand(&self, by: i32) -> Self {
        Self {
            x: self.x - by,
            y: self.y - by,
            width: self.width + 2 * by,
            height: self.height + 2 * by,
        }
    }

    /// Returns a rectangle of the same size centered inside `outer`.
    #[must_use]
    pub const fn centered_in(&self, outer: &Self) -> Self {
        Self {
            x: outer.x + (outer.width - self.width) / 2,
            y: outer.y + (outer.height - self.height) / 2,
            width: self.width,
            height: self.height,
        }
    }

    /// Translates the rectangle by a delta.
    #[must_use]
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert_eq!(rect.area(), 5000);
    }

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains_point(0, 0));
        assert!(rect.contains_point(9, 9));
        assert!(!rect.contains_point(10, 5));
    }

    #[test]
    fn test_rect_intersects_ignores_shared_edges() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        let c = Rect::new(5, 5, 10, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&b));
    }

    #[test]
    fn test_shrink_then_expand_is_identity() {
        let rect = Rect::new(4, 4, 200, 100);
        assert_eq!(rect.shrink(6).expand(6), rect);
    }

    #[test]
    fn test_shrink_keeps_one_pixel() {
        let rect = Rect::new(0, 0, 4, 4).shrink(10);
        assert_eq!(rect.width, 1);
        assert_eq!(rect.height, 1);
    }

    #[test]
    fn test_centered_in() {
        let outer = Rect::new(0, 0, 1000, 800);
        let inner = Rect::new(0, 0, 200, 100).centered_in(&outer);
        assert_eq!(inner, Rect::new(400, 350, 200, 100));
    }

    #[test]
    fn test_display() {
        assert_eq!(Rect::new(1, 2, 3, 4).to_string(), "3x4+1+2");
    }
}
