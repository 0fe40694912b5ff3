//! Traits for backends.

use crate::nv_tree::NativeView;
use crate::rect::Rect;

/// A backend implementation.
///
/// The native-view tree calls into the backend to mirror its structure; the backend never calls
/// back. Events are fed to the host separately.
pub trait Backend {
    /// A reference to a view in the backend.
    type ViewRef;

    /// Error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a new view.
    fn new_view(&mut self, view: &NativeView) -> Result<Self::ViewRef, Self::Error>;

    /// Updates the view.
    fn update_view(
        &mut self,
        view: &mut Self::ViewRef,
        update: &NativeView,
    ) -> Result<(), Self::Error>;

    /// Destroys a view. Its subviews have already been removed.
    fn remove_view(&mut self, view: Self::ViewRef) -> Result<(), Self::Error>;

    /// Replaces the view’s subviews, in paint order before z-index sorting.
    ///
    /// A `None` superview stands for the window: its subviews are the window content followed by
    /// the overlay layers, bottom to top.
    fn set_subviews(
        &mut self,
        superview: Option<&Self::ViewRef>,
        subviews: Vec<&Self::ViewRef>,
    ) -> Result<(), Self::Error>;

    /// Sets the window-space frame computed by layout.
    fn set_frame(&mut self, view: &Self::ViewRef, frame: Rect) -> Result<(), Self::Error>;
}
