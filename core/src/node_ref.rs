use crate::view::ViewId;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// A reference to a mounted native view, filled in by the view tree.
///
/// Attach it to a layer via `Layer::node_ref`; while that layer is mounted, [`NodeRef::current`]
/// returns its id. Equality is identity: two refs are equal only if they are clones of each other.
#[derive(Clone, Default)]
pub struct NodeRef(Arc<Mutex<Option<ViewId>>>);

impl NodeRef {
    pub fn new() -> NodeRef {
        NodeRef::default()
    }

    /// The id of the view this ref is bound to, if it is mounted.
    pub fn current(&self) -> Option<ViewId> {
        *self.0.lock()
    }

    pub(crate) fn bind(&self, id: ViewId) {
        *self.0.lock() = Some(id);
    }

    /// Clears the ref if it still points to the given view.
    pub(crate) fn unbind(&self, id: ViewId) {
        let mut current = self.0.lock();
        if *current == Some(id) {
            *current = None;
        }
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.current()).finish()
    }
}
