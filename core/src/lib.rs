//! Core of the perch UI library.
//!
//! # Conceptual overview
//! Perch is a small declarative view-based UI framework.
//!
//! ## Views
//! There are two types of views: native views, and regular composite views (as well as some special
//! view types like fragments). Native views like layers will be visible on-screen and can be
//! interacted with, while composite views are simply made up of other (simpler) views.
//!
//! Views have properties, state, and a body. When a view is created in code, it is not an actual
//! view but a virtual representation of a view, and should hence be very cheap to create: views
//! should not do anything on their own when created other than storing their properties. When the
//! view is realized, it will be asked to create a state object which will persist over the
//! lifetime of the view. Side effects and other things should be taken care of here, in the state’s
//! lifecycle hooks. Finally, the view body is derived from its properties and its state and
//! declares the view’s subviews.
//!
//! ## Portals
//! A [`Portal`] renders its subviews into an overlay layer at the window root instead of into its
//! native ancestor. Overlays cover the whole window and stack above the window content in the
//! order they were created. State and contexts still flow through the view tree as if the portal
//! content was rendered in place.
//!
//! ## Events
//! Pointer presses target the topmost layer under the pointer and then bubble up through its native
//! ancestors until a layer with a pointer action handles them. Overlay layers are transparent.
//!
//! Key presses are not targeted at all: views subscribe to them through their [`Context`] and every
//! subscriber receives every press. The [`Subscription`](keys::Subscription) handle unsubscribes
//! when dropped, so it should be kept in the view state.
//!
//! ## Layout
//! Layout is performed top-down, meaning a superview will perform its layout first, define the
//! content box of its subviews, and then the subviews will do the same. Layers that fit their
//! content are the exception: their size is computed bottom-up from their subviews first.
//!
//! Frames from the last layout can be read from state hooks via [`Context::measure`] and a
//! [`NodeRef`] attached to a layer.
//!
//! ## Contexts
//! Contexts are used to propagate lateral parameters (e.g. a UI theme) down the view tree without
//! having to copy it into the view props every single time. They should be cheap to create and
//! clone (possibly making use of Arcs). Views may choose to modify the context to be different
//! for their subviews, too.
//!
//! ## Coordinate System
//! As the host is usually a window, this will be in terms of windows: the origin of the top-level
//! coordinate system is at the top left corner of the window’s content area. The y-axis is oriented
//! such that positive y points down.
//!
//! ## NVTree and Backends
//! To get the views in a ViewTree to show up on screen, an NVTree (native-view tree) and a backend
//! is required. The NVTree is like the ViewTree, except it only contains native views, and is the
//! structure where pointer events and layout are handled. It’s also responsible for keeping the
//! backend in sync with the view tree.
//!
//! Backends are platform-specific drawing surfaces; abstracted to a common interface.

pub mod backend;
pub mod color;
mod context;
pub mod events;
pub mod keys;
mod layer;
mod node_ref;
pub mod nv_tree;
mod overlay;
mod portal;
pub mod raw_events;
mod rect;
#[macro_use]
mod view;
mod view_tree;

pub use color::Color;
pub use context::Context;
pub use layer::{Easing, Layer, LayerProps, Placement, Shadow, Sizing, Transition};
pub use node_ref::NodeRef;
pub use nv_tree::{NVTree, NativeView, Patch, PatchError};
pub use overlay::OverlayStack;
pub use portal::Portal;
pub use rect::Rect;
pub use view::{Fragment, State, View, ViewId};
pub use view_tree::ViewTree;
