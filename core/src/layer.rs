use crate::color::Color;
use crate::events::{EventHandler, Pointer};
use crate::impl_view;
use crate::node_ref::NodeRef;
use crate::nv_tree::NativeView;
use crate::view::{fragments_eq, Fragment};
use cgmath::{Matrix3, SquareMatrix, Vector2};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a layer sits inside its superview’s content box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Offset of the top left corner from the content box origin.
    Offset(Vector2<f64>),
    /// Distances from the top edge and the right edge of the content box.
    TopRight { top: f64, right: f64 },
    /// At the content box origin, covering the whole content box unless the size is fixed.
    Fill,
}

/// How a layer’s size is determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    Fixed(Vector2<f64>),
    /// Wraps the subviews, plus padding.
    FitContent,
}

/// A drop shadow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: Color,
}

/// Timing curves for animated property changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// How the backend animates changes to a layer’s opacity and transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub duration: Duration,
    pub easing: Easing,
}

impl Transition {
    pub fn new(duration: Duration, easing: Easing) -> Transition {
        Transition { duration, easing }
    }
}

/// A native view that contains graphical content and may have subviews.
pub struct Layer<Ctx> {
    pub key: Option<u64>,

    /// Position inside the superview.
    pub placement: Placement,

    /// Layer size.
    pub size: Sizing,

    /// Inset between the layer bounds and the content box its subviews are placed in.
    pub padding: f64,

    /// Background color, with which the layer bounds will be filled--respecting the corner radius.
    pub background: Color,

    /// Corner radius.
    pub corner_radius: f64,

    /// Border (width, color).
    pub border: Option<(f64, Color)>,

    pub shadow: Option<Shadow>,

    /// Whether contents will be clipped to the layer’s bounds.
    pub clip_contents: bool,

    /// Layer affine transform. Only the translation takes part in layout and hit testing.
    pub transform: Matrix3<f64>,

    /// Layer opacity.
    pub opacity: f64,

    /// Stacking order among siblings; higher is on top. Ties keep declaration order.
    pub z_index: i32,

    pub transition: Option<Transition>,

    /// Bound to this layer while it is mounted.
    pub node_ref: Option<NodeRef>,

    /// Subviews of this layer.
    pub subviews: Fragment<Ctx>,

    pub pointer_action: Option<EventHandler<Pointer>>,
}

impl<Ctx> fmt::Debug for Layer<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Layer")
            .field("key", &self.key)
            .field("placement", &self.placement)
            .field("size", &self.size)
            .field("padding", &self.padding)
            .field("background", &self.background)
            .field("corner_radius", &self.corner_radius)
            .field("border", &self.border)
            .field("shadow", &self.shadow)
            .field("opacity", &self.opacity)
            .field("z_index", &self.z_index)
            .field("subviews", &self.subviews)
            .field("pointer_action", &self.pointer_action.is_some())
            .finish()
    }
}

impl<Ctx> Default for Layer<Ctx> {
    fn default() -> Self {
        Layer {
            key: None,
            placement: Placement::Offset(Vector2::new(0., 0.)),
            size: Sizing::FitContent,
            padding: 0.,
            background: Color::default(),
            corner_radius: 0.,
            border: None,
            shadow: None,
            clip_contents: false,
            transform: Matrix3::identity(),
            opacity: 1.,
            z_index: 0,
            transition: None,
            node_ref: None,
            subviews: Vec::new(),
            pointer_action: None,
        }
    }
}

impl<Ctx: 'static> PartialEq for Layer<Ctx> {
    fn eq(&self, other: &Layer<Ctx>) -> bool {
        self.key == other.key
            && self.placement == other.placement
            && self.size == other.size
            && self.padding == other.padding
            && self.background == other.background
            && self.corner_radius == other.corner_radius
            && self.border == other.border
            && self.shadow == other.shadow
            && self.clip_contents == other.clip_contents
            && self.transform == other.transform
            && self.opacity == other.opacity
            && self.z_index == other.z_index
            && self.transition == other.transition
            && self.node_ref == other.node_ref
            && self.pointer_action == other.pointer_action
            && fragments_eq(&self.subviews, &other.subviews)
    }
}

impl_view! {
    Layer<Ctx>;
    fn body(&self, _state: &()) {
        std::sync::Arc::new(self.subviews.clone())
    }
    fn key(&self) -> Option<u64> {
        self.key
    }
    fn native_view(&self) -> Option<NativeView> {
        Some(NativeView::Layer(self.props()))
    }
    fn node_ref(&self) -> Option<&NodeRef> {
        self.node_ref.as_ref()
    }
}

impl<Ctx> Layer<Ctx> {
    /// A layer of fixed size at an offset.
    pub fn at(x: f64, y: f64, width: f64, height: f64) -> Self {
        Layer {
            placement: Placement::Offset(Vector2::new(x, y)),
            size: Sizing::Fixed(Vector2::new(width, height)),
            ..Layer::default()
        }
    }

    /// The translation part of the transform.
    pub fn translation(&self) -> Vector2<f64> {
        Vector2::new(self.transform.z.x, self.transform.z.y)
    }

    pub(crate) fn props(&self) -> LayerProps {
        LayerProps {
            placement: self.placement,
            size: self.size,
            padding: self.padding,
            background: self.background,
            corner_radius: self.corner_radius,
            border: self.border,
            shadow: self.shadow,
            clip_contents: self.clip_contents,
            transform: self.transform,
            opacity: self.opacity,
            z_index: self.z_index,
            transition: self.transition,
            pointer_action: self.pointer_action.clone(),
        }
    }
}

/// The native part of a layer: everything except its subviews.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProps {
    pub placement: Placement,
    pub size: Sizing,
    pub padding: f64,
    pub background: Color,
    pub corner_radius: f64,
    pub border: Option<(f64, Color)>,
    pub shadow: Option<Shadow>,
    pub clip_contents: bool,
    pub transform: Matrix3<f64>,
    pub opacity: f64,
    pub z_index: i32,
    pub transition: Option<Transition>,
    pub pointer_action: Option<EventHandler<Pointer>>,
}

impl LayerProps {
    pub fn translation(&self) -> Vector2<f64> {
        Vector2::new(self.transform.z.x, self.transform.z.y)
    }
}
