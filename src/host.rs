use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use cgmath::Vector2;
use perch_core::backend::Backend;
use perch_core::raw_events::RawEvent;
use perch_core::{NVTree, NodeRef, PatchError, Rect, View, ViewTree};
use std::sync::Arc;
use thiserror::Error;

/// Ticks after which [`Host::settle`] gives up.
const MAX_SETTLE_TICKS: usize = 64;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("views still requested ticks after {0} tick boundaries")]
    Unsettled(usize),
}

/// Connects a view tree to a backend.
///
/// Platform events are queued through the sender from [`Host::event_sender`] and handled in
/// [`Host::poll`]; nothing happens between calls.
pub struct Host<B: Backend, Ctx = ()> {
    tree: ViewTree<Ctx>,
    nv_tree: NVTree<B>,
    context: Ctx,
    viewport: Vector2<f64>,
    event_send: Sender<RawEvent>,
    event_recv: Receiver<RawEvent>,
}

impl<B: Backend, Ctx: 'static + Clone + Send> Host<B, Ctx> {
    /// Creates a new Host with a window of the given size.
    ///
    /// Nothing is rendered until you call `render`.
    pub fn new(backend: B, viewport: Vector2<f64>, context: Ctx) -> Host<B, Ctx> {
        let (event_send, event_recv) = channel::unbounded();

        Host {
            tree: ViewTree::new(),
            nv_tree: NVTree::new(backend),
            context,
            viewport,
            event_send,
            event_recv,
        }
    }

    /// A sender for platform events; may be moved to another thread.
    pub fn event_sender(&self) -> Sender<RawEvent> {
        self.event_send.clone()
    }

    /// Renders a new root view and commits it.
    pub fn render(&mut self, view: Arc<dyn View<Ctx>>) -> Result<(), HostError> {
        self.tree.render_root(view, self.context.clone());
        self.commit()
    }

    /// Receives all events from the event queue, then runs one tick boundary and updates the
    /// tree accordingly.
    pub fn poll(&mut self) -> Result<(), HostError> {
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => self.recv_raw_event(event),
                Err(TryRecvError::Empty) => break,
                // unreachable while we hold a sender
                Err(TryRecvError::Disconnected) => break,
            }
        }

        self.tree.run_ticks();
        self.tree.update();
        self.commit()
    }

    /// Polls until no view is waiting for a tick.
    ///
    /// Returns the number of polls.
    pub fn settle(&mut self) -> Result<usize, HostError> {
        let mut polls = 0;
        loop {
            self.poll()?;
            polls += 1;
            if !self.tree.has_pending_ticks() {
                return Ok(polls);
            }
            if polls >= MAX_SETTLE_TICKS {
                log::warn!("giving up on settling after {} ticks", polls);
                return Err(HostError::Unsettled(polls));
            }
        }
    }

    fn recv_raw_event(&mut self, event: RawEvent) {
        log::trace!("received {:?}", event);
        match event {
            RawEvent::Key(key) => self.tree.dispatch_key(&key),
            RawEvent::Pointer(pointer) => {
                if !self.nv_tree.dispatch_pointer(&pointer) {
                    log::trace!("pointer press at {:?} went unhandled", pointer.location);
                }
            }
            RawEvent::Resize(size) => self.viewport = size,
        }
    }

    /// Applies pending patches, lays out, and publishes the new frames to the view tree.
    fn commit(&mut self) -> Result<(), HostError> {
        for patch in self.tree.patches() {
            self.nv_tree.patch(patch)?;
        }
        self.nv_tree.layout(self.viewport)?;
        self.tree.set_layout(self.viewport, self.nv_tree.frames());
        Ok(())
    }

    pub fn viewport(&self) -> Vector2<f64> {
        self.viewport
    }

    pub fn tree(&self) -> &ViewTree<Ctx> {
        &self.tree
    }

    pub fn nv_tree(&self) -> &NVTree<B> {
        &self.nv_tree
    }

    pub fn backend(&self) -> &B {
        self.nv_tree.backend()
    }

    /// The frame of the layer a ref is attached to, as of the last commit.
    pub fn frame_of(&self, node_ref: &NodeRef) -> Option<Rect> {
        self.nv_tree.frame(node_ref.current()?)
    }
}
