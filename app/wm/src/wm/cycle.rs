//! Ordered sequence with a current-item cursor.
//!
//! Every workspace keeps three of these (live, iconified and disowned
//! clients). The order is the tiling order; the cursor is the focus.

use serde::{Deserialize, Serialize};

/// Direction for rotations and swap-moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Forward,
    Backward,
}

/// An ordered sequence of unique items with a cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusCycle<T> {
    items: Vec<T>,
    cursor: Option<usize>,
}

impl<T> Default for FocusCycle<T> {
    fn default() -> Self {
        Self { items: Vec::new(), cursor: None }
    }
}

impl<T: Copy + PartialEq> FocusCycle<T> {
    /// Creates an empty cycle.
    #[must_use]
    pub const fn new() -> Self { Self { items: Vec::new(), cursor: None } }

    #[must_use]
    pub fn len(&self) -> usize { self.items.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    #[must_use]
    pub fn contains(&self, item: T) -> bool { self.items.contains(&item) }

    #[must_use]
    pub fn as_slice(&self) -> &[T] { &self.items }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ { self.items.iter().copied() }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> { self.items.get(index).copied() }

    #[must_use]
    pub fn index_of(&self, item: T) -> Option<usize> { self.items.iter().position(|&i| i == item) }

    /// The item under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<T> { self.cursor.and_then(|idx| self.get(idx)) }

    #[must_use]
    pub const fn current_index(&self) -> Option<usize> { self.cursor }

    /// Appends an item; no-op if already present.
    pub fn push_back(&mut self, item: T) {
        if !self.contains(item) {
            self.items.push(item);
        }
    }

    /// Inserts an item at `index` (clamped); no-op if already present.
    pub fn insert_at(&mut self, index: usize, item: T) {
        if self.contains(item) {
            return;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        if let Some(cursor) = self.cursor
            && index <= cursor
        {
            self.cursor = Some(cursor + 1);
        }
    }

    /// Removes an item. When the cursor pointed at it, the cursor moves to
    /// the item that took its place (or the new last item).
    pub fn remove(&mut self, item: T) -> bool {
        let Some(index) = self.index_of(item) else {
            return false;
        };
        self.items.remove(index);

        self.cursor = match self.cursor {
            _ if self.items.is_empty() => None,
            Some(cursor) if cursor > index => Some(cursor - 1),
            Some(cursor) if cursor == index => Some(cursor.min(self.items.len() - 1)),
            other => other,
        };
        true
    }

    /// Moves the cursor onto `item`.
    pub fn set_current(&mut self, item: T) -> bool {
        match self.index_of(item) {
            Some(index) => {
                self.cursor = Some(index);
                true
            }
            None => false,
        }
    }

    /// Clears the cursor without touching the items.
    pub const fn clear_current(&mut self) { self.cursor = None; }

    /// Indexed jump: moves the cursor to `index` if it exists.
    pub fn focus_index(&mut self, index: usize) -> Option<T> {
        let item = self.get(index)?;
        self.cursor = Some(index);
        Some(item)
    }

    /// Advances the cursor one step, wrapping around.
    pub fn rotate(&mut self, direction: Direction) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len();
        let next = match (self.cursor, direction) {
            (None, _) => 0,
            (Some(cursor), Direction::Forward) => (cursor + 1) % len,
            (Some(cursor), Direction::Backward) => (cursor + len - 1) % len,
        };
        self.cursor = Some(next);
        self.get(next)
    }

    /// Rotates the items inside `start..end` by one position. The cursor
    /// stays on the same slot, so it ends up on a different item.
    pub fn rotate_range(&mut self, start: usize, end: usize, direction: Direction) -> bool {
        let end = end.min(self.items.len());
        if end <= start || end - start < 2 {
            return false;
        }
        let slice = &mut self.items[start..end];
        match direction {
            Direction::Forward => slice.rotate_right(1),
            Direction::Backward => slice.rotate_left(1),
        }
        true
    }

    /// Swaps the current item with its neighbour (wrapping) and keeps the
    /// cursor on the moved item.
    pub fn swap_move(&mut self, direction: Direction) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let len = self.items.len();
        if len < 2 {
            return false;
        }
        let target = match direction {
            Direction::Forward => (cursor + 1) % len,
            Direction::Backward => (cursor + len - 1) % len,
        };
        self.items.swap(cursor, target);
        self.cursor = Some(target);
        true
    }

    /// Promotes the current item to the head by swapping it with the head.
    /// When the head is already current, the second item is promoted.
    ///
    /// Returns the two swapped items `(promoted, demoted)`.
    pub fn zoom(&mut self) -> Option<(T, T)> {
        let cursor = self.cursor?;
        if self.items.len() < 2 {
            return None;
        }
        let source = if cursor == 0 { 1 } else { cursor };
        self.items.swap(0, source);
        self.cursor = Some(0);
        Some((self.items[0], self.items[source]))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle_of(items: &[u32]) -> FocusCycle<u32> {
        let mut cycle = FocusCycle::new();
        for &item in items {
            cycle.push_back(item);
        }
        cycle
    }

    #[test]
    fn test_push_back_is_idempotent() {
        let mut cycle = cycle_of(&[1, 2]);
        cycle.push_back(1);
        assert_eq!(cycle.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_remove_current_moves_cursor_to_successor() {
        let mut cycle = cycle_of(&[1, 2, 3]);
        cycle.set_current(2);
        assert!(cycle.remove(2));
        assert_eq!(cycle.current(), Some(3));
    }

    #[test]
    fn test_remove_last_current_moves_cursor_back() {
        let mut cycle = cycle_of(&[1, 2, 3]);
        cycle.set_current(3);
        cycle.remove(3);
        assert_eq!(cycle.current(), Some(2));
    }

    #[test]
    fn test_remove_before_cursor_keeps_item() {
        let mut cycle = cycle_of(&[1, 2, 3]);
        cycle.set_current(3);
        cycle.remove(1);
        assert_eq!(cycle.current(), Some(3));
    }

    #[test]
    fn test_remove_only_item_clears_cursor() {
        let mut cycle = cycle_of(&[1]);
        cycle.set_current(1);
        cycle.remove(1);
        assert_eq!(cycle.current(), None);
        assert!(cycle.is_empty());
    }

    #[test]
    fn test_insert_before_cursor_shifts_cursor() {
        let mut cycle = cycle_of(&[1, 2]);
        cycle.set_current(2);
        cycle.insert_at(0, 9);
        assert_eq!(cycle.current(), Some(2));
        assert_eq!(cycle.as_slice(), &[9, 1, 2]);
    }

    #[test]
    fn test_rotate_wraps() {
        let mut cycle = cycle_of(&[1, 2, 3]);
        assert_eq!(cycle.rotate(Direction::Forward), Some(1));
        assert_eq!(cycle.rotate(Direction::Backward), Some(3));
        assert_eq!(cycle.rotate(Direction::Forward), Some(1));
    }

    #[test]
    fn test_focus_index_out_of_range() {
        let mut cycle = cycle_of(&[1, 2]);
        assert_eq!(cycle.focus_index(5), None);
        assert_eq!(cycle.focus_index(1), Some(2));
    }

    #[test]
    fn test_swap_move_follows_item() {
        let mut cycle = cycle_of(&[1, 2, 3]);
        cycle.set_current(1);
        assert!(cycle.swap_move(Direction::Forward));
        assert_eq!(cycle.as_slice(), &[2, 1, 3]);
        assert_eq!(cycle.current(), Some(1));

        cycle.set_current(2);
        assert!(cycle.swap_move(Direction::Backward));
        assert_eq!(cycle.as_slice(), &[3, 1, 2]);
        assert_eq!(cycle.current(), Some(2));
    }

    #[test]
    fn test_zoom_promotes_current() {
        let mut cycle = cycle_of(&[1, 2, 3]);
        cycle.set_current(3);
        assert_eq!(cycle.zoom(), Some((3, 1)));
        assert_eq!(cycle.as_slice(), &[3, 2, 1]);
        assert_eq!(cycle.current(), Some(3));
    }

    #[test]
    fn test_zoom_on_head_promotes_second() {
        let mut cycle = cycle_of(&[1, 2, 3]);
        cycle.set_current(1);
        assert_eq!(cycle.zoom(), Some((2, 1)));
        assert_eq!(cycle.as_slice(), &[2, 1, 3]);
    }

    #[test]
    fn test_rotate_range_requires_two_members() {
        let mut cycle = cycle_of(&[1, 2, 3, 4]);
        assert!(!cycle.rotate_range(0, 1, Direction::Forward));
        assert!(cycle.rotate_range(1, 4, Direction::Forward));
        assert_eq!(cycle.as_slice(), &[1, 4, 2, 3]);
        assert!(cycle.rotate_range(1, 4, Direction::Backward));
        assert_eq!(cycle.as_slice(), &[1, 2, 3, 4]);
    }
}
