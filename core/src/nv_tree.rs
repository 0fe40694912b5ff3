use crate::backend::Backend;
use crate::events::Pointer;
use crate::layer::{LayerProps, Placement, Sizing};
use crate::overlay::OverlayStack;
use crate::rect::Rect;
use crate::view::ViewId;
use cgmath::{EuclideanSpace, Point2, Vector2, Zero};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum NativeView {
    Layer(LayerProps),
    /// A window-sized container at the window root, stacked above the window content.
    Overlay,
}

/// Patches for the NV tree.
#[derive(Debug, Clone)]
pub enum Patch {
    /// Updates or creates a view.
    Update(ViewId, NativeView),
    /// Removes a view and all of its subviews.
    Remove(ViewId),
    /// Sets a view’s subviews. `None` stands for the window content.
    Subviews(Option<ViewId>, Vec<ViewId>),
}

/// Errors that may occur when running a patch.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("no such native view: {0:?}")]
    NoSuchView(ViewId),
    #[error("native view {0:?} would become its own subview")]
    Cycle(ViewId),
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PatchError {
    fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> PatchError {
        PatchError::Backend(Box::new(err))
    }
}

struct NVTNode<R> {
    view: NativeView,
    backing_ref: R,
    superview: Option<ViewId>,
    subviews: Vec<ViewId>,
    /// Window-space frame from the last layout, if the view was reachable.
    frame: Option<Rect>,
}

/// The native-view tree; handles layout, events, and backends.
pub struct NVTree<B: Backend> {
    nodes: HashMap<ViewId, NVTNode<B::ViewRef>>,
    backend: B,
    /// Top-level views of the window content.
    window: Vec<ViewId>,
    overlays: OverlayStack,
    viewport: Vector2<f64>,
}

impl<B: Backend> NVTree<B> {
    pub fn new(backend: B) -> NVTree<B> {
        NVTree {
            nodes: HashMap::new(),
            backend,
            window: Vec::new(),
            overlays: OverlayStack::new(),
            viewport: Vector2::zero(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn overlays(&self) -> &OverlayStack {
        &self.overlays
    }

    pub fn view(&self, id: ViewId) -> Option<&NativeView> {
        self.nodes.get(&id).map(|node| &node.view)
    }

    pub fn superview(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(&id).and_then(|node| node.superview)
    }

    pub fn subviews(&self, id: ViewId) -> &[ViewId] {
        self.nodes.get(&id).map_or(&[], |node| &node.subviews)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Patches the view tree.
    pub fn patch(&mut self, patch: Patch) -> Result<(), PatchError> {
        log::trace!("applying {:?}", patch);
        match patch {
            Patch::Update(id, view) => self.update_view(id, view),
            Patch::Remove(id) => self.remove_view(id),
            Patch::Subviews(id, subviews) => self.set_subviews(id, subviews),
        }
    }

    /// Updates or adds a view.
    fn update_view(&mut self, id: ViewId, view: NativeView) -> Result<(), PatchError> {
        if let Some(node) = self.nodes.get_mut(&id) {
            self.backend
                .update_view(&mut node.backing_ref, &view)
                .map_err(PatchError::backend)?;
            node.view = view;
            return Ok(());
        }

        let backing_ref = self.backend.new_view(&view).map_err(PatchError::backend)?;
        let is_overlay = view == NativeView::Overlay;
        self.nodes.insert(
            id,
            NVTNode {
                view,
                backing_ref,
                superview: None,
                subviews: Vec::new(),
                frame: None,
            },
        );

        if is_overlay {
            self.overlays.push(id);
            log::debug!("overlay {:?} pushed ({} open)", id, self.overlays.len());
            self.sync_subviews(None)?;
        }
        Ok(())
    }

    /// Removes a view from its superview and destroys it along with its subviews.
    fn remove_view(&mut self, id: ViewId) -> Result<(), PatchError> {
        let superview = match self.nodes.get(&id) {
            Some(node) => node.superview,
            None => return Err(PatchError::NoSuchView(id)),
        };

        let was_overlay = self.overlays.remove(id);
        if was_overlay {
            log::debug!("overlay {:?} removed ({} open)", id, self.overlays.len());
        }

        match superview {
            Some(superview) => {
                if let Some(node) = self.nodes.get_mut(&superview) {
                    node.subviews.retain(|subview| *subview != id);
                }
            }
            None => self.window.retain(|view| *view != id),
        }

        self.remove_subtree(id)?;

        match superview {
            Some(superview) if self.nodes.contains_key(&superview) => {
                self.sync_subviews(Some(superview))
            }
            Some(_) => Ok(()),
            None => self.sync_subviews(None),
        }
    }

    fn remove_subtree(&mut self, id: ViewId) -> Result<(), PatchError> {
        let node = match self.nodes.remove(&id) {
            Some(node) => node,
            None => return Err(PatchError::NoSuchView(id)),
        };
        for subview in node.subviews {
            self.remove_subtree(subview)?;
        }
        self.backend
            .remove_view(node.backing_ref)
            .map_err(PatchError::backend)
    }

    fn set_subviews(
        &mut self,
        superview: Option<ViewId>,
        subviews: Vec<ViewId>,
    ) -> Result<(), PatchError> {
        if let Some(superview) = superview {
            if subviews.contains(&superview) {
                return Err(PatchError::Cycle(superview));
            }
            if !self.nodes.contains_key(&superview) {
                return Err(PatchError::NoSuchView(superview));
            }
        }

        // set the superview property of all subviews
        for subview in &subviews {
            match self.nodes.get_mut(subview) {
                Some(node) => node.superview = superview,
                None => return Err(PatchError::NoSuchView(*subview)),
            }
        }

        match superview {
            Some(superview) => {
                if let Some(node) = self.nodes.get_mut(&superview) {
                    node.subviews = subviews;
                }
            }
            None => self.window = subviews,
        }

        self.sync_subviews(superview)
    }

    /// Sends a view’s current subview list to the backend.
    fn sync_subviews(&mut self, superview: Option<ViewId>) -> Result<(), PatchError> {
        let ids: Vec<ViewId> = match superview {
            Some(id) => self.subviews(id).to_vec(),
            None => self.window.iter().copied().chain(self.overlays.iter()).collect(),
        };

        let superview_ref = match superview {
            Some(id) => match self.nodes.get(&id) {
                Some(node) => Some(&node.backing_ref),
                None => return Err(PatchError::NoSuchView(id)),
            },
            None => None,
        };

        let mut subview_refs = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.nodes.get(id) {
                Some(node) => subview_refs.push(&node.backing_ref),
                None => return Err(PatchError::NoSuchView(*id)),
            }
        }

        self.backend
            .set_subviews(superview_ref, subview_refs)
            .map_err(PatchError::backend)
    }

    /// Lays out every reachable view for the given window size and reports frames to the backend.
    pub fn layout(&mut self, viewport: Vector2<f64>) -> Result<(), PatchError> {
        self.viewport = viewport;
        let screen = Rect::new(Point2::origin(), viewport);

        let mut frames = HashMap::new();
        for id in self.window.iter().copied().chain(self.overlays.iter()) {
            self.place(id, screen, &mut frames);
        }

        for (id, node) in self.nodes.iter_mut() {
            node.frame = frames.get(id).copied();
            if let Some(frame) = node.frame {
                self.backend
                    .set_frame(&node.backing_ref, frame)
                    .map_err(PatchError::backend)?;
            }
        }
        Ok(())
    }

    /// Computes frames for a view and its subviews inside the container rectangle.
    fn place(&self, id: ViewId, container: Rect, frames: &mut HashMap<ViewId, Rect>) {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => return,
        };

        let (frame, content) = match &node.view {
            NativeView::Overlay => {
                let screen = Rect::new(Point2::origin(), self.viewport);
                (screen, screen)
            }
            NativeView::Layer(props) => {
                let size = match (props.placement, props.size) {
                    (Placement::Fill, Sizing::FitContent) => container.size,
                    _ => self.intrinsic_size(id),
                };
                let origin = match props.placement {
                    Placement::Offset(offset) => container.origin + offset,
                    Placement::TopRight { top, right } => {
                        Point2::new(container.right() - right - size.x, container.top() + top)
                    }
                    Placement::Fill => container.origin,
                };
                let frame = Rect::new(origin, size) + props.translation();
                (frame, frame.inset(props.padding, props.padding))
            }
        };

        frames.insert(id, frame);
        for subview in &node.subviews {
            self.place(*subview, content, frames);
        }
    }

    /// The size a view takes when it is not filling its container.
    fn intrinsic_size(&self, id: ViewId) -> Vector2<f64> {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => return Vector2::zero(),
        };

        let props = match &node.view {
            NativeView::Overlay => return self.viewport,
            NativeView::Layer(props) => props,
        };

        match props.size {
            Sizing::Fixed(size) => size,
            Sizing::FitContent => {
                let mut extent: Vector2<f64> = Vector2::zero();
                for subview in &node.subviews {
                    let placement = match self.nodes.get(subview).map(|node| &node.view) {
                        Some(NativeView::Layer(child)) => child.placement,
                        _ => continue,
                    };
                    let size = self.intrinsic_size(*subview);
                    let reach = match placement {
                        Placement::Offset(offset) => offset + size,
                        Placement::TopRight { top, right } => {
                            Vector2::new(right + size.x, top + size.y)
                        }
                        Placement::Fill => continue,
                    };
                    extent.x = extent.x.max(reach.x);
                    extent.y = extent.y.max(reach.y);
                }
                extent + Vector2::new(2. * props.padding, 2. * props.padding)
            }
        }
    }

    /// The window-space frame from the last layout.
    pub fn frame(&self, id: ViewId) -> Option<Rect> {
        self.nodes.get(&id).and_then(|node| node.frame)
    }

    /// All frames from the last layout.
    pub fn frames(&self) -> HashMap<ViewId, Rect> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| node.frame.map(|frame| (*id, frame)))
            .collect()
    }

    pub fn viewport(&self) -> Vector2<f64> {
        self.viewport
    }

    fn z_index(&self, id: ViewId) -> i32 {
        match self.nodes.get(&id).map(|node| &node.view) {
            Some(NativeView::Layer(props)) => props.z_index,
            _ => 0,
        }
    }

    /// Sorts sibling views bottom to top.
    fn stacked(&self, ids: &[ViewId]) -> Vec<ViewId> {
        let mut ids = ids.to_vec();
        ids.sort_by_key(|id| self.z_index(*id));
        ids
    }

    /// All views, bottom to top.
    pub fn paint_order(&self) -> Vec<ViewId> {
        fn visit<B: Backend>(tree: &NVTree<B>, id: ViewId, out: &mut Vec<ViewId>) {
            out.push(id);
            for subview in tree.stacked(tree.subviews(id)) {
                visit(tree, subview, out);
            }
        }

        let mut out = Vec::new();
        for id in self.stacked(&self.window) {
            visit(self, id, &mut out);
        }
        for id in self.overlays.iter() {
            visit(self, id, &mut out);
        }
        out
    }

    /// Returns the topmost layer under the point.
    ///
    /// Overlays are transparent to hit testing except for the layers inside them.
    pub fn hit_test(&self, point: Point2<f64>) -> Option<ViewId> {
        for id in self.overlays.iter().rev() {
            if let Some(hit) = self.hit_view(id, point) {
                return Some(hit);
            }
        }
        for id in self.stacked(&self.window).into_iter().rev() {
            if let Some(hit) = self.hit_view(id, point) {
                return Some(hit);
            }
        }
        None
    }

    fn hit_view(&self, id: ViewId, point: Point2<f64>) -> Option<ViewId> {
        let node = self.nodes.get(&id)?;
        let frame = node.frame?;

        if let NativeView::Layer(props) = &node.view {
            if props.clip_contents && !frame.contains(point) {
                return None;
            }
        }

        for subview in self.stacked(&node.subviews).into_iter().rev() {
            if let Some(hit) = self.hit_view(subview, point) {
                return Some(hit);
            }
        }

        match node.view {
            NativeView::Layer(_) if frame.contains(point) => Some(id),
            _ => None,
        }
    }

    /// Delivers a pointer press to the topmost layer under it, bubbling up to the closest layer
    /// with a pointer action. Returns false if nothing handled it.
    pub fn dispatch_pointer(&self, event: &Pointer) -> bool {
        let mut current = self.hit_test(event.location);
        while let Some(id) = current {
            let node = match self.nodes.get(&id) {
                Some(node) => node,
                None => break,
            };
            if let NativeView::Layer(LayerProps {
                pointer_action: Some(action),
                ..
            }) = &node.view
            {
                log::trace!("pointer press at {:?} handled by {:?}", event.location, id);
                action.call(event);
                return true;
            }
            current = node.superview;
        }
        false
    }
}
