//! A floating panel anchored below another view.

use crate::style::{BoxShadow, Style};
use perch_core::events::{Callback, EventHandler, KeyCode, Pointer};
use perch_core::keys::Subscription;
use perch_core::{
    impl_view, Color, Context, Easing, Layer, NodeRef, Placement, Portal, Shadow, State,
    Transition, View,
};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Vertical gap between the anchor’s bottom edge and the panel.
pub const ANCHOR_GAP: f64 = 10.;

pub const BACKDROP_Z: i32 = 999;
pub const PANEL_Z: i32 = 1000;

/// Vertical offset of the panel before it has become visible.
pub const ENTER_OFFSET: f64 = -10.;

pub const TRANSITION_DURATION: Duration = Duration::from_millis(300);

pub fn backdrop_color() -> Color {
    Color::rgba(0., 0., 0., 0.1)
}

pub fn panel_shadow() -> Shadow {
    Shadow {
        offset_x: 0.,
        offset_y: 4.,
        blur: 12.,
        color: Color::rgba(0., 0., 0., 0.15),
    }
}

/// Backdrop style before overrides.
pub fn default_backdrop_style() -> Style {
    Style {
        background: Some(backdrop_color()),
        z_index: Some(BACKDROP_Z),
        ..Style::default()
    }
}

/// Panel style before overrides, for the given visibility.
pub fn default_panel_style(visible: bool, has_shadow: bool) -> Style {
    Style {
        background: Some(Color::WHITE),
        corner_radius: Some(10.),
        padding: Some(10.),
        opacity: Some(if visible { 1. } else { 0. }),
        translate_y: Some(if visible { 0. } else { ENTER_OFFSET }),
        box_shadow: Some(if has_shadow {
            BoxShadow::Drop(panel_shadow())
        } else {
            BoxShadow::None
        }),
        transition: Some(Transition::new(TRANSITION_DURATION, Easing::Ease)),
        z_index: Some(PANEL_Z),
        ..Style::default()
    }
}

/// Panel offset from the window’s top edge and right edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub top: f64,
    pub right: f64,
}

/// Where the popover is in its enter animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not shown, or shown without a fresh position.
    Hidden,
    /// Positioned and rendered in the starting state of the enter animation.
    Armed,
    /// Rendered in its final state.
    Visible,
}

/// A panel floating below an anchor, over a backdrop covering the window.
///
/// The panel is rendered in an overlay at the window root, with its top edge [`ANCHOR_GAP`] below
/// the anchor and its right edge aligned with the anchor’s. Pressing the backdrop or the Escape key
/// calls `on_close`; the popover never closes itself, so `on_close` should eventually render it
/// again with `is_open` unset.
///
/// The position is computed when the popover opens and when the anchor ref is swapped. It is not
/// updated when the window is resized.
pub struct Popover<Ctx> {
    pub key: Option<u64>,
    /// Rendered inside the panel.
    pub content: Arc<dyn View<Ctx>>,
    /// Attached to the layer the popover hangs from.
    pub anchor: NodeRef,
    pub is_open: bool,
    pub on_close: Callback,
    /// Overrides for the panel’s default style.
    pub container_style: Style,
    /// Overrides for the backdrop’s default style.
    pub backdrop_style: Style,
    pub has_shadow: bool,
}

impl<Ctx> Popover<Ctx> {
    /// A closed popover with default styles.
    pub fn new(content: Arc<dyn View<Ctx>>, anchor: NodeRef, on_close: Callback) -> Self {
        Popover {
            key: None,
            content,
            anchor,
            is_open: false,
            on_close,
            container_style: Style::default(),
            backdrop_style: Style::default(),
            has_shadow: true,
        }
    }

    pub fn open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn container_style(mut self, style: Style) -> Self {
        self.container_style = style;
        self
    }

    pub fn backdrop_style(mut self, style: Style) -> Self {
        self.backdrop_style = style;
        self
    }

    pub fn has_shadow(mut self, has_shadow: bool) -> Self {
        self.has_shadow = has_shadow;
        self
    }
}

impl<Ctx> fmt::Debug for Popover<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Popover")
            .field("key", &self.key)
            .field("content", &self.content)
            .field("anchor", &self.anchor)
            .field("is_open", &self.is_open)
            .field("has_shadow", &self.has_shadow)
            .finish()
    }
}

impl<Ctx: 'static> PartialEq for Popover<Ctx> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && View::eq(&*self.content, &*other.content)
            && self.anchor == other.anchor
            && self.is_open == other.is_open
            && self.on_close == other.on_close
            && self.container_style == other.container_style
            && self.backdrop_style == other.backdrop_style
            && self.has_shadow == other.has_shadow
    }
}

/// State of a mounted popover.
pub struct PopoverState {
    phase: Phase,
    /// Kept after closing; reused if the popover reopens while the anchor can’t be measured.
    position: Option<Position>,
    is_open: bool,
    anchor: NodeRef,
    on_close: Callback,
    /// Backdrop press handler; replaced along with `on_close`.
    dismiss: EventHandler<Pointer>,
    escape: Option<Subscription>,
    /// Set when the position must be recomputed at the next tick, after the anchor was laid out.
    reposition: bool,
}

impl fmt::Debug for PopoverState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PopoverState")
            .field("phase", &self.phase)
            .field("position", &self.position)
            .field("is_open", &self.is_open)
            .field("escape", &self.escape.is_some())
            .finish()
    }
}

impl PopoverState {
    fn new<Ctx>(popover: &Popover<Ctx>) -> PopoverState {
        PopoverState {
            phase: Phase::Hidden,
            position: None,
            is_open: popover.is_open,
            anchor: popover.anchor.clone(),
            on_close: popover.on_close.clone(),
            dismiss: dismiss_handler(&popover.on_close),
            escape: None,
            reposition: false,
        }
    }

    fn subscribe_escape<Ctx>(&mut self, cx: &Context<Ctx>) {
        // release the old listener before adding its replacement
        self.escape = None;
        let on_close = self.on_close.clone();
        self.escape = Some(cx.subscribe_keys(move |key| {
            if key.code == KeyCode::Escape {
                on_close.call();
            }
        }));
    }

    /// Schedules a position update, or hides the popover if it is closed.
    fn open_changed<Ctx>(&mut self, cx: &Context<Ctx>) {
        if self.is_open {
            self.reposition = true;
            cx.request_tick();
        } else {
            self.reposition = false;
            self.phase = Phase::Hidden;
        }
    }

    fn update_position<Ctx>(&mut self, cx: &Context<Ctx>) {
        if !self.is_open {
            self.phase = Phase::Hidden;
            return;
        }

        match cx.measure(&self.anchor) {
            Some(rect) => {
                let position = Position {
                    top: rect.bottom() + ANCHOR_GAP,
                    right: cx.viewport().x - rect.right(),
                };
                log::debug!("popover {:?} positioned at {:?}", cx.id(), position);
                self.position = Some(position);
                self.phase = Phase::Armed;
                cx.request_tick();
            }
            None => {
                log::debug!("popover {:?} has no laid-out anchor; staying hidden", cx.id());
                self.phase = Phase::Hidden;
            }
        }
    }
}

fn dismiss_handler(on_close: &Callback) -> EventHandler<Pointer> {
    let on_close = on_close.clone();
    EventHandler::new(move |_: &Pointer| on_close.call())
}

impl<Ctx: 'static> State<Ctx> for PopoverState {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn will_appear(&mut self, _view: &dyn View<Ctx>, cx: &Context<Ctx>) {
        self.subscribe_escape(cx);
        self.open_changed(cx);
    }

    fn will_update(&mut self, update: &dyn View<Ctx>, cx: &Context<Ctx>) {
        let popover = match update.as_any().downcast_ref::<Popover<Ctx>>() {
            Some(popover) => popover,
            None => return,
        };

        if popover.on_close != self.on_close {
            self.on_close = popover.on_close.clone();
            self.dismiss = dismiss_handler(&self.on_close);
            self.subscribe_escape(cx);
        }

        if popover.is_open != self.is_open || popover.anchor != self.anchor {
            self.is_open = popover.is_open;
            self.anchor = popover.anchor.clone();
            self.open_changed(cx);
        }
    }

    fn tick(&mut self, cx: &Context<Ctx>) {
        if self.reposition {
            self.reposition = false;
            self.update_position(cx);
            cx.request_render();
        } else if self.phase == Phase::Armed {
            self.phase = Phase::Visible;
            cx.request_render();
        }
    }

    fn will_disappear(&mut self, cx: &Context<Ctx>) {
        log::trace!("popover {:?} unmounting", cx.id());
        self.escape = None;
    }
}

impl_view! {
    Popover<Ctx>;
    fn new_state(&self, cx) {
        Box::new(PopoverState::new(self))
    }
    fn body(&self, state: &PopoverState) {
        let position = match state.position {
            Some(position) if self.is_open => position,
            _ => return Arc::new(()),
        };

        let mut backdrop: Layer<Ctx> = Layer {
            placement: Placement::Fill,
            pointer_action: Some(state.dismiss.clone()),
            ..Layer::default()
        };
        default_backdrop_style()
            .merge(&self.backdrop_style)
            .apply(&mut backdrop);

        let mut panel: Layer<Ctx> = Layer {
            placement: Placement::TopRight {
                top: position.top,
                right: position.right,
            },
            subviews: vec![Arc::clone(&self.content)],
            ..Layer::default()
        };
        default_panel_style(state.phase == Phase::Visible, self.has_shadow)
            .merge(&self.container_style)
            .apply(&mut panel);

        let layers: Vec<Arc<dyn View<Ctx>>> = vec![Arc::new(backdrop), Arc::new(panel)];
        Arc::new(Portal::new(layers))
    }
    fn key(&self) -> Option<u64> {
        self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_defaults_follow_visibility() {
        let entering = default_panel_style(false, true);
        assert_eq!(entering.opacity, Some(0.));
        assert_eq!(entering.translate_y, Some(ENTER_OFFSET));
        assert_eq!(entering.box_shadow, Some(BoxShadow::Drop(panel_shadow())));

        let shown = default_panel_style(true, false);
        assert_eq!(shown.opacity, Some(1.));
        assert_eq!(shown.translate_y, Some(0.));
        assert_eq!(shown.box_shadow, Some(BoxShadow::None));
        assert_eq!(shown.z_index, Some(PANEL_Z));
    }

    #[test]
    fn equality_tracks_callback_identity() {
        let anchor = NodeRef::new();
        let on_close = Callback::new(|| ());
        let content: Arc<dyn View<()>> = Arc::new(());
        let a = Popover::new(Arc::clone(&content), anchor.clone(), on_close.clone());
        let b = Popover::new(Arc::clone(&content), anchor.clone(), on_close).open(false);
        assert_eq!(a, b);

        let c = Popover::new(content, anchor, Callback::new(|| ()));
        assert_ne!(a, c);
    }
}
