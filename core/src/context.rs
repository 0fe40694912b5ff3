use crate::events::Key;
use crate::keys::{KeyListeners, Subscription};
use crate::node_ref::NodeRef;
use crate::rect::Rect;
use crate::view::ViewId;
use cgmath::{Vector2, Zero};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::mem;
use std::sync::Arc;

/// Frames from the most recent layout pass.
#[derive(Debug, Clone)]
pub(crate) struct FrameSnapshot {
    pub(crate) viewport: Vector2<f64>,
    pub(crate) frames: HashMap<ViewId, Rect>,
}

/// Bookkeeping shared between a view tree and the contexts it hands out.
pub(crate) struct Shared {
    dirty: Mutex<HashSet<ViewId>>,
    ticks: Mutex<HashSet<ViewId>>,
    pub(crate) keys: KeyListeners,
    pub(crate) layout: RwLock<FrameSnapshot>,
}

impl Shared {
    pub(crate) fn new() -> Shared {
        Shared {
            dirty: Mutex::new(HashSet::new()),
            ticks: Mutex::new(HashSet::new()),
            keys: KeyListeners::new(),
            layout: RwLock::new(FrameSnapshot {
                viewport: Vector2::zero(),
                frames: HashMap::new(),
            }),
        }
    }

    pub(crate) fn take_dirty(&self) -> HashSet<ViewId> {
        mem::take(&mut *self.dirty.lock())
    }

    pub(crate) fn take_ticks(&self) -> HashSet<ViewId> {
        mem::take(&mut *self.ticks.lock())
    }

    pub(crate) fn has_pending_ticks(&self) -> bool {
        !self.ticks.lock().is_empty()
    }

    pub(crate) fn forget(&self, id: ViewId) {
        self.dirty.lock().remove(&id);
        self.ticks.lock().remove(&id);
    }
}

/// A view’s context.
///
/// Handed to state lifecycle hooks; it identifies the view and gives access to the tree’s
/// services.
pub struct Context<Ctx> {
    id: ViewId,
    context: Ctx,
    shared: Arc<Shared>,
}

impl<Ctx> Context<Ctx> {
    pub(crate) fn new(id: ViewId, context: Ctx, shared: Arc<Shared>) -> Context<Ctx> {
        Context {
            id,
            context,
            shared,
        }
    }

    /// The view this context belongs to.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The inherited context value.
    pub fn ctx(&self) -> &Ctx {
        &self.context
    }

    /// Asks for the view body to be rendered again on the next update.
    pub fn request_render(&self) {
        self.shared.dirty.lock().insert(self.id);
    }

    /// Asks for [`State::tick`](crate::State::tick) to be called at the next tick boundary.
    ///
    /// Requests made while ticks are running are deferred to the boundary after that.
    pub fn request_tick(&self) {
        self.shared.ticks.lock().insert(self.id);
    }

    /// Subscribes to all key presses. The subscription lasts until the handle is dropped.
    pub fn subscribe_keys<F>(&self, handler: F) -> Subscription
    where
        F: 'static + Fn(&Key) + Send + Sync,
    {
        self.shared.keys.subscribe(self.id, handler)
    }

    /// The window-space frame of the native view a ref points to, as of the last layout.
    ///
    /// Returns `None` if the ref is not bound or the view has not been laid out.
    pub fn measure(&self, node_ref: &NodeRef) -> Option<Rect> {
        let id = node_ref.current()?;
        self.shared.layout.read().frames.get(&id).copied()
    }

    /// The size of the window content area.
    pub fn viewport(&self) -> Vector2<f64> {
        self.shared.layout.read().viewport
    }
}
