use crate::context::{Context, FrameSnapshot, Shared};
use crate::events::Key;
use crate::keys::KeyListeners;
use crate::nv_tree::{NativeView, Patch};
use crate::rect::Rect;
use crate::view::{Fragment, State, View, ViewId};
use cgmath::Vector2;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Composite,
    /// Occupies one slot among its native ancestor’s subviews.
    Native,
    /// A native container at the window root; occupies no slot in its ancestor.
    Portal,
}

impl NodeKind {
    fn of(native_view: Option<&NativeView>) -> NodeKind {
        match native_view {
            None => NodeKind::Composite,
            Some(NativeView::Overlay) => NodeKind::Portal,
            Some(NativeView::Layer(_)) => NodeKind::Native,
        }
    }
}

/// A node in the view tree.
struct TreeNode<Ctx> {
    /// The current view object.
    view: Arc<dyn View<Ctx>>,
    kind: NodeKind,
    /// The immediate superview.
    superview: Option<ViewId>,
    /// The view state.
    state: Box<dyn State<Ctx>>,
    /// An ordered list of all subviews.
    subviews: Vec<ViewId>,
    /// The node’s inherited context.
    context: Ctx,
}

/// A view tree; contains a hierarchy of virtual views and manages rendering and updating.
pub struct ViewTree<Ctx> {
    nodes: HashMap<ViewId, TreeNode<Ctx>>,
    root: Option<ViewId>,
    patches: VecDeque<Patch>,
    shared: Arc<Shared>,
    /// Native containers whose subview lists changed during this pass. `None` is the window.
    stale: HashSet<Option<ViewId>>,
}

impl<Ctx: 'static> Default for ViewTree<Ctx>
where
    Ctx: Clone + Send,
{
    fn default() -> Self {
        ViewTree::new()
    }
}

impl<Ctx: 'static> ViewTree<Ctx>
where
    Ctx: Clone + Send,
{
    pub fn new() -> ViewTree<Ctx> {
        ViewTree {
            nodes: HashMap::new(),
            root: None,
            patches: VecDeque::new(),
            shared: Arc::new(Shared::new()),
            stale: HashSet::new(),
        }
    }

    /// Returns an iterator over available patches.
    ///
    /// Does not drain the queue immediately.
    /// Calling `next` will always remove a patch from the queue.
    pub fn patches(&mut self) -> impl Iterator<Item = Patch> + '_ {
        struct PatchIterator<'a, T>(&'a mut ViewTree<T>);
        impl<'a, T> Iterator for PatchIterator<'a, T> {
            type Item = Patch;
            fn next(&mut self) -> Option<Patch> {
                self.0.patches.pop_front()
            }
        }

        PatchIterator(self)
    }

    pub fn root(&self) -> Option<ViewId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The key subscriber registry of this tree.
    pub fn key_listeners(&self) -> &KeyListeners {
        &self.shared.keys
    }

    /// Renders a root view.
    pub fn render_root(&mut self, view: Arc<dyn View<Ctx>>, context: Ctx) {
        let root_id = match self.root {
            Some(root) => root,
            None => {
                let root = ViewId::new();
                self.root = Some(root);
                self.stale.insert(None);
                root
            }
        };
        self.diff(root_id, &view, None, context);
        self.flush();
    }

    /// Re-renders the bodies of all views that requested it, ancestors first.
    pub fn update(&mut self) {
        let mut dirty: Vec<_> = self
            .shared
            .take_dirty()
            .into_iter()
            .map(|id| (self.depth(id), id))
            .collect();
        dirty.sort();

        for (_, id) in dirty {
            // may have disappeared while rendering an ancestor
            if self.nodes.contains_key(&id) {
                log::trace!("re-rendering {:?}", id);
                self.render_body(id);
            }
        }
        self.flush();
    }

    /// Calls [`State::tick`] on every view that requested a tick before this call.
    ///
    /// Ticks requested while this runs are kept for the next call.
    pub fn run_ticks(&mut self) {
        for id in self.shared.take_ticks() {
            if let Some(node) = self.nodes.get_mut(&id) {
                let cx = Context::new(id, node.context.clone(), Arc::clone(&self.shared));
                node.state.tick(&cx);
            }
        }
    }

    pub fn has_pending_ticks(&self) -> bool {
        self.shared.has_pending_ticks()
    }

    /// Delivers a key press to every key subscriber.
    pub fn dispatch_key(&self, key: &Key) {
        log::trace!("dispatching {:?} to {} subscribers", key, self.shared.keys.len());
        self.shared.keys.dispatch(key);
    }

    /// Publishes the frames of the last layout for [`Context::measure`].
    pub fn set_layout(&self, viewport: Vector2<f64>, frames: HashMap<ViewId, Rect>) {
        *self.shared.layout.write() = FrameSnapshot { viewport, frames };
    }

    fn depth(&self, id: ViewId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(&id).and_then(|node| node.superview);
        while let Some(id) = current {
            depth += 1;
            current = self.nodes.get(&id).and_then(|node| node.superview);
        }
        depth
    }

    /// Diffs a view with its current state in the tree and renders its body.
    ///
    /// - `id`: the view id, for identifying the tree node
    /// - `view`: the new view
    /// - `superview`: the superview, used if the node is new
    fn diff(
        &mut self,
        id: ViewId,
        view: &Arc<dyn View<Ctx>>,
        superview: Option<ViewId>,
        context: Ctx,
    ) {
        let existing = self.nodes.get(&id).map(|node| {
            let is_same_type = node.view.as_any().type_id() == view.as_any().type_id();
            (is_same_type, is_same_type && View::eq(&*node.view, &**view))
        });

        match existing {
            // same type and equal; only the context may have changed
            Some((true, true)) => {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.context = context;
                }
            }
            // same type; can be diffed
            Some((true, false)) => self.update_view(id, view, context),
            // different type; needs to be replaced
            Some((false, _)) => self.replace_view(id, view, context),
            // does not exist; needs to be added
            None => self.add_view(id, view, superview, context),
        }

        self.render_body(id);
    }

    /// Adds a new view to the tree.
    fn add_view(
        &mut self,
        id: ViewId,
        view: &Arc<dyn View<Ctx>>,
        superview: Option<ViewId>,
        context: Ctx,
    ) {
        let cx = Context::new(id, context.clone(), Arc::clone(&self.shared));
        let mut state = view.new_state(&cx);

        let native_view = view.native_view();
        let kind = NodeKind::of(native_view.as_ref());
        if let Some(native_view) = native_view {
            self.patches.push_back(Patch::Update(id, native_view));
        }
        if let Some(node_ref) = view.node_ref() {
            node_ref.bind(id);
        }

        state.will_appear(&**view, &cx);

        self.nodes.insert(
            id,
            TreeNode {
                view: Arc::clone(view),
                kind,
                superview,
                state,
                subviews: Vec::new(),
                context,
            },
        );
    }

    /// Updates an existing view with new properties, which must be of the same type.
    fn update_view(&mut self, id: ViewId, view: &Arc<dyn View<Ctx>>, context: Ctx) {
        let node = self.nodes.get_mut(&id).expect("updating nonexistent view");
        debug_assert!(
            node.view.as_any().type_id() == view.as_any().type_id(),
            "update_view called with incorrect type"
        );

        let cx = Context::new(id, context.clone(), Arc::clone(&self.shared));
        node.state.will_update(&**view, &cx);

        if node.kind == NodeKind::Native {
            if let Some(native_view) = view.native_view() {
                self.patches.push_back(Patch::Update(id, native_view));
            }
        }

        if node.view.node_ref() != view.node_ref() {
            if let Some(old) = node.view.node_ref() {
                old.unbind(id);
            }
            if let Some(new) = view.node_ref() {
                new.bind(id);
            }
        }

        node.view = Arc::clone(view);
        node.context = context;
    }

    /// Replaces a view with another of a different type, keeping its id.
    ///
    /// The view must exist.
    fn replace_view(&mut self, id: ViewId, view: &Arc<dyn View<Ctx>>, context: Ctx) {
        let superview = self
            .nodes
            .get(&id)
            .expect("replacing nonexistent view")
            .superview;

        self.remove_view(id, true);
        self.add_view(id, view, superview, context);
        self.stale.insert(self.container_of(id));
    }

    /// Removes a view and its subviews.
    ///
    /// Does *not* remove the view from the superview’s `subviews` list. If `emit_patch` is set,
    /// the topmost native views of this subtree are removed from the NV tree.
    fn remove_view(&mut self, id: ViewId, emit_patch: bool) {
        let mut node = match self.nodes.remove(&id) {
            Some(node) => node,
            None => return,
        };

        let cx = Context::new(id, node.context.clone(), Arc::clone(&self.shared));
        node.state.will_disappear(&cx);
        if let Some(node_ref) = node.view.node_ref() {
            node_ref.unbind(id);
        }
        self.shared.forget(id);

        // overlays are never part of their ancestor’s native subtree
        match node.kind {
            NodeKind::Portal => self.patches.push_back(Patch::Remove(id)),
            NodeKind::Native if emit_patch => self.patches.push_back(Patch::Remove(id)),
            _ => (),
        }

        let emit_for_subviews = emit_patch && node.kind == NodeKind::Composite;
        for subview in node.subviews.drain(..) {
            self.remove_view(subview, emit_for_subviews);
        }
        // state is dropped here, releasing anything it holds
    }

    fn render_body(&mut self, id: ViewId) {
        let node = &self.nodes[&id];
        let body = node.view.body(node.state.as_any());
        let subview_context = node
            .view
            .subview_context(node.state.as_any(), &node.context)
            .unwrap_or_else(|| node.context.clone());

        self.diff_subviews(id, body, subview_context);
    }

    /// Diffs the subview/the subviews of a node.
    fn diff_subviews(&mut self, superview: ViewId, subview: Arc<dyn View<Ctx>>, context: Ctx) {
        let mut single_subview_storage = Vec::with_capacity(1);
        let subviews = match subview.as_any().downcast_ref::<Fragment<Ctx>>() {
            Some(subviews) => subviews, // list of subviews
            None => match subview.as_any().downcast_ref::<()>() {
                Some(()) => &single_subview_storage, // no subviews at all
                None => {
                    // single subview
                    single_subview_storage.push(Arc::clone(&subview));
                    &single_subview_storage
                }
            },
        };

        // To identify which existing subview and newly rendered subview are meant to be the same,
        // each subview has a key.

        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        enum Key {
            /// A user-specified key.
            Key(u64),
            /// An automatically assigned key.
            AutoKey(u64),
        }

        // If a subview doesn’t have a user-specified key, it’ll be auto-keyed sequentially by
        // index ignoring user-keyed items, e.g.
        //
        // array     [A, B, C(key=1), D(key=2), E]
        // auto-key   0  1                      2

        let mut auto_key_counter = 0;
        let mut current_subviews_by_key = HashMap::new();
        for id in &self.nodes[&superview].subviews {
            let key = self.nodes[id].view.key().map(Key::Key).unwrap_or_else(|| {
                let k = auto_key_counter;
                auto_key_counter += 1;
                Key::AutoKey(k)
            });
            current_subviews_by_key.insert(key, *id);
        }

        let mut auto_key_counter = 0;
        let mut new_subviews = Vec::with_capacity(subviews.len());

        for view in subviews {
            let key = view.key().map(Key::Key).unwrap_or_else(|| {
                let k = auto_key_counter;
                auto_key_counter += 1;
                Key::AutoKey(k)
            });

            let subview_id = match current_subviews_by_key.remove(&key) {
                // this new subview already has a corresponding old subview
                Some(id) => id,
                // no existing view with the same key, needs to be created
                None => ViewId::new(),
            };
            self.diff(subview_id, view, Some(superview), context.clone());
            new_subviews.push(subview_id);
        }

        // unused subviews need to be removed
        for (_, id) in current_subviews_by_key {
            self.remove_view(id, true);
        }

        if new_subviews != self.nodes[&superview].subviews {
            self.stale.insert(self.nv_container(superview));
        }
        if let Some(node) = self.nodes.get_mut(&superview) {
            node.subviews = new_subviews;
        }
    }

    /// The native container that the subviews of a view are placed in. `None` is the window.
    fn nv_container(&self, id: ViewId) -> Option<ViewId> {
        match self.nodes.get(&id) {
            Some(node) if node.kind != NodeKind::Composite => Some(id),
            Some(_) => self.container_of(id),
            None => None,
        }
    }

    /// The native container a view itself is placed in.
    fn container_of(&self, id: ViewId) -> Option<ViewId> {
        match self.nodes.get(&id).and_then(|node| node.superview) {
            Some(superview) => self.nv_container(superview),
            None => None,
        }
    }

    /// Collects the native views that fill a container’s subview list, in order.
    fn native_children(&self, container: Option<ViewId>) -> Vec<ViewId> {
        fn collect<Ctx>(nodes: &HashMap<ViewId, TreeNode<Ctx>>, id: ViewId, out: &mut Vec<ViewId>) {
            let node = match nodes.get(&id) {
                Some(node) => node,
                None => return,
            };
            match node.kind {
                NodeKind::Native => out.push(id),
                NodeKind::Portal => (),
                NodeKind::Composite => {
                    for subview in &node.subviews {
                        collect(nodes, *subview, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        match container {
            Some(container) => {
                if let Some(node) = self.nodes.get(&container) {
                    for subview in &node.subviews {
                        collect(&self.nodes, *subview, &mut out);
                    }
                }
            }
            None => {
                if let Some(root) = self.root {
                    collect(&self.nodes, root, &mut out);
                }
            }
        }
        out
    }

    /// Queues subview patches for every container that changed.
    fn flush(&mut self) {
        let stale: Vec<_> = self.stale.drain().collect();
        for container in stale {
            if let Some(id) = container {
                if !self.nodes.contains_key(&id) {
                    continue;
                }
            }
            let subviews = self.native_children(container);
            self.patches.push_back(Patch::Subviews(container, subviews));
        }
    }
}
