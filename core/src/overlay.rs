//! The overlay-layer registry.

use crate::view::ViewId;

/// Overlay layers in stacking order, bottom to top.
///
/// Portals push their overlay when they appear and remove it when they disappear. Removing an
/// overlay that is not on top keeps the relative order of the rest.
#[derive(Debug, Clone, Default)]
pub struct OverlayStack {
    layers: Vec<ViewId>,
}

impl OverlayStack {
    pub fn new() -> OverlayStack {
        OverlayStack::default()
    }

    /// Puts an overlay on top. Pushing an overlay twice moves it to the top.
    pub fn push(&mut self, id: ViewId) {
        self.remove(id);
        self.layers.push(id);
    }

    /// Removes an overlay; returns false if it was not in the stack.
    pub fn remove(&mut self, id: ViewId) -> bool {
        match self.layers.iter().position(|layer| *layer == id) {
            Some(pos) => {
                self.layers.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn top(&self) -> Option<ViewId> {
        self.layers.last().copied()
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.layers.contains(&id)
    }

    /// Iterates bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ViewId> + '_ {
        self.layers.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_remove_keep_order() {
        let (a, b, c) = (ViewId::new(), ViewId::new(), ViewId::new());
        let mut stack = OverlayStack::new();
        stack.push(a);
        stack.push(b);
        stack.push(c);
        assert_eq!(stack.top(), Some(c));

        assert!(stack.remove(b));
        assert!(!stack.remove(b));
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![a, c]);

        stack.push(a);
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![c, a]);
        assert_eq!(stack.len(), 2);
    }
}
