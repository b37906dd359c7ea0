//! Global Z-order.
//!
//! Windows that are not clients (docks, desktops, notifications) live in one
//! of five fixed layers. Clients are ordered per workspace and slotted between
//! the layers by [`WindowStack::compose`], which produces the single
//! front-to-back list handed to the display in one restack call.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, WindowId};

/// Fixed Z-order band for external windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Layer {
    Desktop,
    Below,
    Dock,
    Above,
    Notification,
}

impl Layer {
    pub const ALL: [Self; 5] =
        [Self::Desktop, Self::Below, Self::Dock, Self::Above, Self::Notification];

    const fn slot(self) -> usize {
        match self {
            Self::Desktop => 0,
            Self::Below => 1,
            Self::Dock => 2,
            Self::Above => 3,
            Self::Notification => 4,
        }
    }
}

/// Restacking class of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Disowned,
    Fullscreen,
    Above,
    Below,
    Floating,
    Normal,
}

/// A client handed to [`WindowStack::compose`], already in workspace
/// stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackMember {
    pub window: WindowId,
    pub bucket: Bucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    window: WindowId,
    geometry: Rect,
}

/// Five layer lists, front of each list first.
#[derive(Debug, Clone, Default)]
pub struct WindowStack {
    layers: [Vec<Entry>; 5],
}

impl WindowStack {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Layer of a window, if stacked.
    #[must_use]
    pub fn layer_of(&self, window: WindowId) -> Option<Layer> {
        Layer::ALL.into_iter().find(|layer| self.position(*layer, window).is_some())
    }

    #[must_use]
    pub fn contains(&self, window: WindowId) -> bool { self.layer_of(window).is_some() }

    /// Windows of a layer, front first.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = WindowId> + '_ {
        self.layers[layer.slot()].iter().map(|e| e.window)
    }

    fn position(&self, layer: Layer, window: WindowId) -> Option<usize> {
        self.layers[layer.slot()].iter().position(|e| e.window == window)
    }

    fn entry(&self, window: WindowId) -> Option<(Layer, usize)> {
        Layer::ALL
            .into_iter()
            .find_map(|layer| self.position(layer, window).map(|idx| (layer, idx)))
    }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    /// Adds a window at the front of a layer. No-op when already stacked.
    pub fn add(&mut self, window: WindowId, layer: Layer, geometry: Rect) -> bool {
        if self.contains(window) {
            return false;
        }
        self.layers[layer.slot()].insert(0, Entry { window, geometry });
        true
    }

    pub fn remove(&mut self, window: WindowId) -> bool {
        let Some((layer, idx)) = self.entry(window) else {
            return false;
        };
        self.layers[layer.slot()].remove(idx);
        true
    }

    /// Moves a window to the front of another layer.
    pub fn relayer(&mut self, window: WindowId, layer: Layer) -> bool {
        let Some((current, idx)) = self.entry(window) else {
            return false;
        };
        if current == layer {
            return false;
        }
        let entry = self.layers[current.slot()].remove(idx);
        self.layers[layer.slot()].insert(0, entry);
        true
    }

    pub fn set_geometry(&mut self, window: WindowId, geometry: Rect) -> bool {
        let Some((layer, idx)) = self.entry(window) else {
            return false;
        };
        self.layers[layer.slot()][idx].geometry = geometry;
        true
    }

    // ------------------------------------------------------------------------
    // Ordering within a layer
    // ------------------------------------------------------------------------

    /// Moves a window to the front of its layer.
    pub fn raise(&mut self, window: WindowId) -> bool {
        let Some((layer, idx)) = self.entry(window) else {
            return false;
        };
        let list = &mut self.layers[layer.slot()];
        let entry = list.remove(idx);
        list.insert(0, entry);
        true
    }

    /// Moves a window to the back of its layer.
    pub fn lower(&mut self, window: WindowId) -> bool {
        let Some((layer, idx)) = self.entry(window) else {
            return false;
        };
        let list = &mut self.layers[layer.slot()];
        let entry = list.remove(idx);
        list.push(entry);
        true
    }

    /// Places `window` directly in front of `sibling`. Both must share a layer.
    pub fn raise_above(&mut self, window: WindowId, sibling: WindowId) -> bool {
        self.insert_relative(window, sibling, 0)
    }

    /// Places `window` directly behind `sibling`. Both must share a layer.
    pub fn lower_below(&mut self, window: WindowId, sibling: WindowId) -> bool {
        self.insert_relative(window, sibling, 1)
    }

    fn insert_relative(&mut self, window: WindowId, sibling: WindowId, offset: usize) -> bool {
        if window == sibling {
            return false;
        }
        let (Some((layer, idx)), Some((sibling_layer, _))) =
            (self.entry(window), self.entry(sibling))
        else {
            return false;
        };
        if layer != sibling_layer {
            tracing::trace!(window, sibling, "stack: relative move across layers ignored");
            return false;
        }
        let list = &mut self.layers[layer.slot()];
        let entry = list.remove(idx);
        let Some(anchor) = list.iter().position(|e| e.window == sibling) else {
            return false;
        };
        list.insert(anchor + offset, entry);
        true
    }

    // ------------------------------------------------------------------------
    // Occlusion
    // ------------------------------------------------------------------------

    /// Whether the rectangles of two stacked windows overlap.
    #[must_use]
    pub fn occluded_by(&self, window: WindowId, other: WindowId) -> bool {
        let (Some(a), Some(b)) = (self.geometry(window), self.geometry(other)) else {
            return false;
        };
        a.intersects(&b)
    }

    /// Whether any window in front of `window` in its layer overlaps it.
    #[must_use]
    pub fn occluded_by_any(&self, window: WindowId) -> bool {
        let Some((layer, idx)) = self.entry(window) else {
            return false;
        };
        let list = &self.layers[layer.slot()];
        list[..idx].iter().any(|e| e.geometry.intersects(&list[idx].geometry))
    }

    /// Whether `window` overlaps any window behind it in its layer.
    #[must_use]
    pub fn occludes_any(&self, window: WindowId) -> bool {
        let Some((layer, idx)) = self.entry(window) else {
            return false;
        };
        let list = &self.layers[layer.slot()];
        list[idx + 1..].iter().any(|e| e.geometry.intersects(&list[idx].geometry))
    }

    fn geometry(&self, window: WindowId) -> Option<Rect> {
        self.entry(window).map(|(layer, idx)| self.layers[layer.slot()][idx].geometry)
    }

    // ------------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------------

    /// Builds the full front-to-back order for a workspace.
    ///
    /// `members` are the workspace's clients in its own stacking order; they
    /// are bucketed and interleaved with the layers as follows: notification
    /// layer, fullscreen, above layer, above, floating, disowned, normal,
    /// dock layer, below, below layer, desktop layer.
    #[must_use]
    pub fn compose(&self, members: &[StackMember]) -> Vec<WindowId> {
        let bucket = |wanted: Bucket| {
            members.iter().filter(move |m| m.bucket == wanted).map(|m| m.window)
        };

        let mut order = Vec::with_capacity(
            members.len() + self.layers.iter().map(Vec::len).sum::<usize>(),
        );
        order.extend(self.layer(Layer::Notification));
        order.extend(bucket(Bucket::Fullscreen));
        order.extend(self.layer(Layer::Above));
        order.extend(bucket(Bucket::Above));
        order.extend(bucket(Bucket::Floating));
        order.extend(bucket(Bucket::Disowned));
        order.extend(bucket(Bucket::Normal));
        order.extend(self.layer(Layer::Dock));
        order.extend(bucket(Bucket::Below));
        order.extend(self.layer(Layer::Below));
        order.extend(self.layer(Layer::Desktop));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32) -> Rect { Rect::new(x, 0, 100, 100) }

    #[test]
    fn test_add_is_idempotent() {
        let mut stack = WindowStack::new();
        assert!(stack.add(1, Layer::Dock, rect(0)));
        assert!(!stack.add(1, Layer::Above, rect(0)));
        assert_eq!(stack.layer_of(1), Some(Layer::Dock));
    }

    #[test]
    fn test_relayer_moves_between_layers() {
        let mut stack = WindowStack::new();
        stack.add(1, Layer::Dock, rect(0));
        assert!(stack.relayer(1, Layer::Notification));
        assert_eq!(stack.layer_of(1), Some(Layer::Notification));
        assert_eq!(stack.layer(Layer::Dock).count(), 0);
    }

    #[test]
    fn test_raise_and_lower() {
        let mut stack = WindowStack::new();
        for w in 1..=3 {
            stack.add(w, Layer::Above, rect(0));
        }
        // Front first: 3, 2, 1
        stack.raise(1);
        assert_eq!(stack.layer(Layer::Above).collect::<Vec<_>>(), vec![1, 3, 2]);
        stack.lower(3);
        assert_eq!(stack.layer(Layer::Above).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_relative_moves_require_same_layer() {
        let mut stack = WindowStack::new();
        stack.add(1, Layer::Above, rect(0));
        stack.add(2, Layer::Above, rect(0));
        stack.add(3, Layer::Above, rect(0));
        stack.add(9, Layer::Dock, rect(0));

        assert!(!stack.raise_above(1, 9));
        assert!(stack.raise_above(1, 3));
        assert_eq!(stack.layer(Layer::Above).collect::<Vec<_>>(), vec![1, 3, 2]);
        assert!(stack.lower_below(1, 2));
        assert_eq!(stack.layer(Layer::Above).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_occlusion() {
        let mut stack = WindowStack::new();
        stack.add(1, Layer::Dock, rect(0));
        stack.add(2, Layer::Dock, rect(50));
        stack.add(3, Layer::Dock, rect(500));

        assert!(stack.occluded_by(1, 2));
        assert!(!stack.occluded_by(1, 3));
        // Front first: 3, 2, 1
        assert!(stack.occluded_by_any(1));
        assert!(!stack.occluded_by_any(2));
        assert!(stack.occludes_any(2));
        assert!(!stack.occludes_any(3));
    }

    #[test]
    fn test_compose_order() {
        let mut stack = WindowStack::new();
        stack.add(100, Layer::Desktop, rect(0));
        stack.add(101, Layer::Below, rect(0));
        stack.add(102, Layer::Dock, rect(0));
        stack.add(103, Layer::Above, rect(0));
        stack.add(104, Layer::Notification, rect(0));

        let members = [
            StackMember { window: 1, bucket: Bucket::Normal },
            StackMember { window: 2, bucket: Bucket::Below },
            StackMember { window: 3, bucket: Bucket::Floating },
            StackMember { window: 4, bucket: Bucket::Fullscreen },
            StackMember { window: 5, bucket: Bucket::Disowned },
            StackMember { window: 6, bucket: Bucket::Above },
        ];
        assert_eq!(
            stack.compose(&members),
            vec![104, 4, 103, 6, 3, 5, 1, 102, 2, 101, 100]
        );
    }
}
