use crate::context::Context;
use crate::node_ref::NodeRef;
use crate::nv_tree::NativeView;
use core::any::Any;
use core::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for a view.
///
/// (this is just a UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u32, u16, u16, [u8; 8]);

impl ViewId {
    pub(crate) fn new() -> ViewId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        ViewId(a, b, c, *d)
    }
}

/// Implements the `View` trait for a given struct.
///
/// Assumes that `PartialEq` is implemented. `Eq` would be preferred to avoid frequent updates.
///
/// Syntax:
///
/// ```text
/// impl_view! {
///     StructName;
///     fn new_state(&self, context) { // optional
///         ... -> Box<dyn State<Ctx>>
///     }
///     fn body(&self, state_variable: &StateType) {
///         ... -> Arc<dyn View<Ctx>>
///     }
///     (put extra items like key() here, using normal rust syntax)
/// }
/// ```
///
/// The generated impl is generic over a context type named `Ctx`, which the struct may use.
#[macro_export]
macro_rules! impl_view {
    (
        $(#[$attr:meta])*
        $struct:ty;
        $(fn new_state(&$ns_self:ident, $ns_ctx:ident) $new_state:block)?
        fn body(&$self:ident, $state_var:ident: &$state_type:ty) $body:block
        $($extra:tt)*
    ) => {
        $(#[$attr])*
        impl<Ctx: 'static> $crate::View<Ctx> for $struct {
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            $(
                #[allow(unused_variables)]
                fn new_state(
                    &$ns_self,
                    $ns_ctx: &$crate::Context<Ctx>,
                ) -> ::std::boxed::Box<dyn $crate::State<Ctx>> {
                    $new_state
                }
            )?

            fn body(
                &$self,
                state: &dyn ::core::any::Any,
            ) -> ::std::sync::Arc<dyn $crate::View<Ctx>> {
                match state.downcast_ref::<$state_type>() {
                    #[allow(unused_variables)]
                    Some($state_var) => $body,
                    None => panic!(
                        "View::body: invalid state for {}; expected type {}",
                        stringify!($struct),
                        stringify!($state_type)
                    ),
                }
            }

            fn eq(&self, other: &dyn $crate::View<Ctx>) -> bool {
                match other.as_any().downcast_ref::<Self>() {
                    Some(other) => self == other,
                    None => false,
                }
            }

            $($extra)*
        }
    };
}

/// Views are the basic components of UI: they encapsulate properties and state to render a body
/// that’s composed of more views.
///
/// `View` implementors themselves should be cheap and fast to create, as they are not actual views
/// but their virtual representation à la virtual DOM. Similarly, `body` should be fast to compute,
/// preferably as a pure function dependent only on the view properties and the view state.
///
/// This trait should probably be implemented using the [`impl_view`] macro.
///
/// # Panics
/// `body` should always return a native view, eventually. Notably, care should be taken when
/// returning non-native views such that it doesn’t cause a cycle and end up causing an infinite
/// loop.
pub trait View<Ctx>: Any + fmt::Debug + Send + Sync {
    /// Creates a new state object for this view.
    ///
    /// Will create [`()`] by default.
    fn new_state(&self, context: &Context<Ctx>) -> Box<dyn State<Ctx>> {
        let _ = context;
        Box::new(())
    }

    /// Renders the body of this view.
    fn body(&self, state: &dyn Any) -> Arc<dyn View<Ctx>>;

    /// Compares this view to another; used for diffing.
    fn eq(&self, other: &dyn View<Ctx>) -> bool;

    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// A key used to identify this view in an array of views.
    ///
    /// Should be derived from a `key` property.
    fn key(&self) -> Option<u64> {
        None
    }

    /// Returns a subview context.
    fn subview_context(&self, state: &dyn Any, context: &Ctx) -> Option<Ctx> {
        let _ = (state, context);
        None
    }

    /// Returns the native view description if this is a native view.
    ///
    /// Should always be None for types outside of this crate.
    #[doc(hidden)]
    fn native_view(&self) -> Option<NativeView> {
        None
    }

    /// The reference to bind to this view while it is mounted, if any.
    #[doc(hidden)]
    fn node_ref(&self) -> Option<&NodeRef> {
        None
    }
}

/// View state associated with a view.
///
/// Will be dropped right after the view disappears.
pub trait State<Ctx>: Any + fmt::Debug + Send {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Called once, before the first body of the associated view is rendered.
    fn will_appear(&mut self, view: &dyn View<Ctx>, context: &Context<Ctx>) {
        let _ = (view, context);
    }

    /// Called before the view is updated from a new virtual view, and before the new body is
    /// rendered.
    fn will_update(&mut self, update: &dyn View<Ctx>, context: &Context<Ctx>) {
        let _ = (update, context);
    }

    /// Called at the tick boundary following a call to [`Context::request_tick`].
    fn tick(&mut self, context: &Context<Ctx>) {
        let _ = context;
    }

    /// Called before the associated view disappears.
    fn will_disappear(&mut self, context: &Context<Ctx>) {
        let _ = context;
    }
}

impl_view! {
    /// An empty view type that does absolutely nothing.
    ();
    fn body(&self, _state: &()) {
        Arc::new(())
    }
}

/// For stateless views.
impl<Ctx> State<Ctx> for () {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type Fragment<Ctx> = Vec<Arc<dyn View<Ctx>>>;

/// A fragment view that expands into its children.
impl<Ctx: 'static> View<Ctx> for Fragment<Ctx> {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn body(&self, _: &dyn Any) -> Arc<dyn View<Ctx>> {
        Arc::new(self.clone())
    }
    fn eq(&self, other: &dyn View<Ctx>) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => fragments_eq(self, other),
            None => false,
        }
    }
}

/// Compares two fragments element-wise.
pub(crate) fn fragments_eq<Ctx: 'static>(a: &Fragment<Ctx>, b: &Fragment<Ctx>) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(i, j)| View::eq(&**i, &**j))
}
