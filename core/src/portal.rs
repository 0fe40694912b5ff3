use crate::impl_view;
use crate::nv_tree::NativeView;
use crate::view::{fragments_eq, Fragment};
use core::fmt;
use std::sync::Arc;

/// Renders its subviews into a new overlay layer at the window root instead of into the
/// surrounding native view.
///
/// The overlay covers the whole window and sits above the window content and above any overlay
/// created before it. It is removed when the portal disappears. State and context still flow
/// through the view tree as if the subviews were rendered in place.
pub struct Portal<Ctx> {
    pub key: Option<u64>,
    pub subviews: Fragment<Ctx>,
}

impl<Ctx> Portal<Ctx> {
    pub fn new(subviews: Fragment<Ctx>) -> Self {
        Portal {
            key: None,
            subviews,
        }
    }
}

impl<Ctx> fmt::Debug for Portal<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Portal")
            .field("key", &self.key)
            .field("subviews", &self.subviews)
            .finish()
    }
}

impl<Ctx: 'static> PartialEq for Portal<Ctx> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && fragments_eq(&self.subviews, &other.subviews)
    }
}

impl_view! {
    Portal<Ctx>;
    fn body(&self, _state: &()) {
        Arc::new(self.subviews.clone())
    }
    fn key(&self) -> Option<u64> {
        self.key
    }
    fn native_view(&self) -> Option<NativeView> {
        Some(NativeView::Overlay)
    }
}
