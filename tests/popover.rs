use cgmath::Vector2;
use perch::perch_core::events::{Key, KeyCode, Pointer};
use perch::perch_core::raw_events::RawEvent;
use perch::perch_core::{Fragment, LayerProps, NativeView, Rect, Shadow, ViewId};
use perch::popover::{backdrop_color, panel_shadow, BACKDROP_Z, PANEL_Z};
use perch::{BoxShadow, Callback, Color, Headless, Host, Layer, NodeRef, Popover, Style, View};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const VIEWPORT: (f64, f64) = (1000., 800.);

/// A window with an anchor layer at (700, 40) sized 100 × 30, followed by a popover.
struct Fixture {
    host: Host<Headless>,
    anchor: NodeRef,
    content: NodeRef,
    closes: Arc<AtomicUsize>,
    on_close: Callback,
}

impl Fixture {
    fn new() -> Fixture {
        let _ = env_logger::builder().is_test(true).try_init();
        let closes = Arc::new(AtomicUsize::new(0));
        let on_close = {
            let closes = Arc::clone(&closes);
            Callback::new(move || {
                closes.fetch_add(1, Ordering::SeqCst);
            })
        };
        Fixture {
            host: Host::new(Headless::new(), Vector2::new(VIEWPORT.0, VIEWPORT.1), ()),
            anchor: NodeRef::new(),
            content: NodeRef::new(),
            closes,
            on_close,
        }
    }

    fn anchor_at(&self, x: f64, y: f64) -> Arc<dyn View<()>> {
        Arc::new(Layer {
            node_ref: Some(self.anchor.clone()),
            ..Layer::<()>::at(x, y, 100., 30.)
        })
    }

    fn popover(&self, is_open: bool) -> Popover<()> {
        let content: Arc<dyn View<()>> = Arc::new(Layer {
            node_ref: Some(self.content.clone()),
            ..Layer::<()>::at(0., 0., 120., 40.)
        });
        Popover::new(content, self.anchor.clone(), self.on_close.clone()).open(is_open)
    }

    fn render_with(&mut self, anchor: Arc<dyn View<()>>, popover: Popover<()>) {
        let root: Fragment<()> = vec![anchor, Arc::new(popover)];
        self.host.render(Arc::new(root)).unwrap();
    }

    fn render(&mut self, popover: Popover<()>) {
        let anchor = self.anchor_at(700., 40.);
        self.render_with(anchor, popover);
    }

    /// Renders an open popover and runs it through its enter animation.
    fn open(&mut self) {
        let popover = self.popover(true);
        self.render(popover);
        self.host.settle().unwrap();
    }

    fn send(&self, event: RawEvent) {
        self.host.event_sender().send(event).unwrap();
    }

    fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn panel_id(&self) -> Option<ViewId> {
        self.host.nv_tree().superview(self.content.current()?)
    }

    fn panel(&self) -> Option<(LayerProps, Rect)> {
        let id = self.panel_id()?;
        match self.host.nv_tree().view(id)? {
            NativeView::Layer(props) => Some((props.clone(), self.host.nv_tree().frame(id)?)),
            NativeView::Overlay => None,
        }
    }

    fn backdrop(&self) -> Option<(LayerProps, Rect)> {
        let overlay = self.host.nv_tree().overlays().top()?;
        let id = *self.host.nv_tree().subviews(overlay).first()?;
        match self.host.nv_tree().view(id)? {
            NativeView::Layer(props) => Some((props.clone(), self.host.nv_tree().frame(id)?)),
            NativeView::Overlay => None,
        }
    }
}

#[test]
fn closed_popover_renders_nothing_but_listens_for_escape() {
    let mut fx = Fixture::new();
    let popover = fx.popover(false);
    fx.render(popover);
    fx.host.settle().unwrap();

    assert!(fx.host.nv_tree().overlays().is_empty());
    assert_eq!(fx.host.backend().window().len(), 1);
    assert_eq!(fx.host.tree().key_listeners().len(), 1);

    fx.send(RawEvent::Key(Key::new(KeyCode::Escape)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 1);
}

#[test]
fn opens_below_anchor_aligned_to_its_right_edge() {
    let mut fx = Fixture::new();
    let popover = fx.popover(true);
    fx.render(popover);

    // the anchor has no frame yet while it is first rendered
    assert!(fx.host.nv_tree().overlays().is_empty());

    // position is computed after layout; the panel enters in its starting state
    fx.host.poll().unwrap();
    let (panel, frame) = fx.panel().expect("panel rendered");
    assert_eq!(panel.opacity, 0.);
    assert_eq!(panel.translation(), Vector2::new(0., -10.));
    // 140 × 60: content plus padding, 10 below the anchor’s bottom edge, shifted up by 10
    assert_eq!(frame, Rect::from_edges(660., 70., 800., 130.));

    // next tick: visible
    fx.host.poll().unwrap();
    let (panel, frame) = fx.panel().expect("panel rendered");
    assert_eq!(panel.opacity, 1.);
    assert_eq!(panel.translation(), Vector2::new(0., 0.));
    assert_eq!(frame, Rect::from_edges(660., 80., 800., 140.));
    assert_eq!(
        fx.host.frame_of(&fx.content),
        Some(Rect::from_edges(670., 90., 790., 130.))
    );

    assert!(!fx.host.tree().has_pending_ticks());
}

#[test]
fn position_follows_anchor_bottom_and_right_edges() {
    let mut fx = Fixture::new();
    // bottom edge at 80, right edge at 300
    let anchor = fx.anchor_at(200., 50.);
    let popover = fx.popover(true);
    fx.render_with(anchor, popover);
    fx.host.settle().unwrap();

    // top 90, 700 from the window’s right edge
    let (_, frame) = fx.panel().unwrap();
    assert_eq!(frame.top(), 90.);
    assert_eq!(frame.right(), 300.);
    assert_eq!(frame, Rect::from_edges(160., 90., 300., 150.));
}

#[test]
fn default_styles() {
    let mut fx = Fixture::new();
    fx.open();

    let (panel, _) = fx.panel().unwrap();
    assert_eq!(panel.background, Color::WHITE);
    assert_eq!(panel.corner_radius, 10.);
    assert_eq!(panel.padding, 10.);
    assert_eq!(panel.z_index, PANEL_Z);
    assert_eq!(panel.shadow, Some(panel_shadow()));
    let transition = panel.transition.expect("panel transition");
    assert_eq!(transition.duration.as_millis(), 300);

    let (backdrop, frame) = fx.backdrop().unwrap();
    assert_eq!(backdrop.background, backdrop_color());
    assert_eq!(backdrop.z_index, BACKDROP_Z);
    assert_eq!(frame, Rect::from_edges(0., 0., VIEWPORT.0, VIEWPORT.1));
}

#[test]
fn overlay_sits_above_window_content() {
    let mut fx = Fixture::new();
    fx.open();

    let tree = fx.host.nv_tree();
    assert_eq!(tree.overlays().len(), 1);
    let overlay = tree.overlays().top().unwrap();
    let panel = fx.panel_id().unwrap();

    // the anchor is the only window content; the overlay comes after it
    let window = fx.host.backend().window();
    assert_eq!(window.len(), 2);
    assert_eq!(tree.superview(panel), Some(overlay));

    let order = tree.paint_order();
    let backdrop = tree.subviews(overlay)[0];
    let position = |id: ViewId| order.iter().position(|view| *view == id).unwrap();
    assert!(position(fx.anchor.current().unwrap()) < position(backdrop));
    assert!(position(backdrop) < position(panel));
}

#[test]
fn backdrop_press_closes() {
    let mut fx = Fixture::new();
    fx.open();

    fx.send(RawEvent::Pointer(Pointer::at(10., 10.)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 1);

    // inside the panel: no close
    fx.send(RawEvent::Pointer(Pointer::at(700., 100.)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 1);
}

#[test]
fn escape_closes_and_other_keys_do_not() {
    let mut fx = Fixture::new();
    fx.open();

    fx.send(RawEvent::Key(Key::new(KeyCode::Char('a'))));
    fx.send(RawEvent::Key(Key::new(KeyCode::Return)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 0);

    fx.send(RawEvent::Key(Key::new(KeyCode::Escape)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 1);
}

#[test]
fn closing_removes_overlay_immediately() {
    let mut fx = Fixture::new();
    fx.open();
    assert_eq!(fx.host.backend().live_views(), 5);

    let popover = fx.popover(false);
    fx.render(popover);
    assert!(fx.host.nv_tree().overlays().is_empty());
    assert_eq!(fx.content.current(), None);
    // only the anchor remains
    assert_eq!(fx.host.backend().live_views(), 1);
    assert_eq!(fx.host.backend().window().len(), 1);
}

#[test]
fn reopening_repositions() {
    let mut fx = Fixture::new();
    fx.open();
    let popover = fx.popover(false);
    fx.render(popover);

    // the anchor moves while closed
    let anchor = fx.anchor_at(100., 200.);
    let popover = fx.popover(false);
    fx.render_with(anchor, popover);
    let anchor = fx.anchor_at(100., 200.);
    let popover = fx.popover(true);
    fx.render_with(anchor, popover);
    fx.host.settle().unwrap();

    let (_, frame) = fx.panel().unwrap();
    assert_eq!(frame.top(), 240.);
    assert_eq!(frame.right(), 200.);
}

#[test]
fn unmount_releases_escape_listener() {
    let mut fx = Fixture::new();
    fx.open();
    assert_eq!(fx.host.tree().key_listeners().len(), 1);

    fx.host.render(Arc::new(())).unwrap();
    assert_eq!(fx.host.tree().key_listeners().len(), 0);
    assert!(fx.host.nv_tree().overlays().is_empty());
    assert_eq!(fx.host.backend().live_views(), 0);

    fx.send(RawEvent::Key(Key::new(KeyCode::Escape)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 0);
}

#[test]
fn new_close_callback_replaces_listener() {
    let mut fx = Fixture::new();
    fx.open();

    let replaced = Arc::new(AtomicUsize::new(0));
    let on_close = {
        let replaced = Arc::clone(&replaced);
        Callback::new(move || {
            replaced.fetch_add(1, Ordering::SeqCst);
        })
    };
    let mut popover = fx.popover(true);
    popover.on_close = on_close;
    fx.render(popover);
    assert_eq!(fx.host.tree().key_listeners().len(), 1);

    fx.send(RawEvent::Key(Key::new(KeyCode::Escape)));
    fx.send(RawEvent::Pointer(Pointer::at(10., 10.)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 0);
    assert_eq!(replaced.load(Ordering::SeqCst), 2);
}

#[test]
fn container_overrides_keep_other_defaults() {
    let mut fx = Fixture::new();
    let popover = fx.popover(true).container_style(Style {
        padding: Some(20.),
        ..Style::default()
    });
    fx.render(popover);
    fx.host.settle().unwrap();

    let (panel, frame) = fx.panel().unwrap();
    assert_eq!(panel.padding, 20.);
    assert_eq!(panel.corner_radius, 10.);
    assert_eq!(panel.background, Color::WHITE);
    assert_eq!(frame, Rect::from_edges(640., 80., 800., 160.));
}

#[test]
fn backdrop_overrides() {
    let mut fx = Fixture::new();
    let tint = Color::rgba(0., 0., 1., 0.3);
    let popover = fx.popover(true).backdrop_style(Style {
        background: Some(tint),
        ..Style::default()
    });
    fx.render(popover);
    fx.host.settle().unwrap();

    let (backdrop, _) = fx.backdrop().unwrap();
    assert_eq!(backdrop.background, tint);
    assert_eq!(backdrop.z_index, BACKDROP_Z);
}

#[test]
fn backdrop_size_override() {
    let mut fx = Fixture::new();
    let popover = fx.popover(true).backdrop_style(Style {
        width: Some(200.),
        height: Some(100.),
        ..Style::default()
    });
    fx.render(popover);
    fx.host.settle().unwrap();

    let (_, frame) = fx.backdrop().unwrap();
    assert_eq!(frame, Rect::from_edges(0., 0., 200., 100.));

    // outside the smaller backdrop nothing handles the press
    fx.send(RawEvent::Pointer(Pointer::at(500., 500.)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 0);

    fx.send(RawEvent::Pointer(Pointer::at(10., 10.)));
    fx.host.poll().unwrap();
    assert_eq!(fx.closes(), 1);
}

#[test]
fn container_overrides_computed_edges() {
    let mut fx = Fixture::new();
    let popover = fx.popover(true).container_style(Style {
        top: Some(5.),
        ..Style::default()
    });
    fx.render(popover);
    fx.host.settle().unwrap();

    // top pinned, right edge still aligned with the anchor
    let (_, frame) = fx.panel().unwrap();
    assert_eq!(frame, Rect::from_edges(660., 5., 800., 65.));

    let popover = fx.popover(true).container_style(Style {
        right: Some(0.),
        ..Style::default()
    });
    fx.render(popover);
    fx.host.settle().unwrap();
    let (_, frame) = fx.panel().unwrap();
    assert_eq!(frame, Rect::from_edges(860., 80., 1000., 140.));
}

#[test]
fn shadow_toggle() {
    let mut fx = Fixture::new();
    let popover = fx.popover(true).has_shadow(false);
    fx.render(popover);
    fx.host.settle().unwrap();
    assert_eq!(fx.panel().unwrap().0.shadow, None);

    let custom = Shadow {
        offset_x: 1.,
        offset_y: 1.,
        blur: 2.,
        color: Color::BLACK,
    };
    let popover = fx
        .popover(true)
        .has_shadow(false)
        .container_style(Style {
            box_shadow: Some(BoxShadow::Drop(custom)),
            ..Style::default()
        });
    fx.render(popover);
    assert_eq!(fx.panel().unwrap().0.shadow, Some(custom));
}

#[test]
fn missing_anchor_stays_hidden() {
    let mut fx = Fixture::new();
    let popover = fx.popover(true);
    // no anchor layer carries the ref
    fx.render_with(Arc::new(()), popover);
    fx.host.settle().unwrap();

    assert!(fx.host.nv_tree().overlays().is_empty());
    assert_eq!(fx.panel(), None);
}

#[test]
fn stale_position_is_reused_while_hidden() {
    let mut fx = Fixture::new();
    fx.open();
    let popover = fx.popover(false);
    fx.render(popover);

    // anchor gone, popover reopened
    let popover = fx.popover(true);
    fx.render_with(Arc::new(()), popover);
    fx.host.settle().unwrap();

    let (panel, frame) = fx.panel().expect("panel rendered at the old position");
    assert_eq!(panel.opacity, 0.);
    assert_eq!(frame.right(), 800.);
    assert_eq!(frame.top(), 70.);
}

#[test]
fn resize_does_not_reposition() {
    let mut fx = Fixture::new();
    fx.open();

    fx.send(RawEvent::Resize(Vector2::new(1200., 800.)));
    fx.host.poll().unwrap();

    // still 200 from the right edge, which moved
    let (_, frame) = fx.panel().unwrap();
    assert_eq!(frame.right(), 1000.);
    assert_eq!(fx.host.viewport(), Vector2::new(1200., 800.));
}

#[test]
fn style_overrides_load_from_json() {
    let mut fx = Fixture::new();
    let style: Style =
        serde_json::from_str(r#"{ "cornerRadius": 4, "background": { "r": 0, "g": 0, "b": 0, "a": 1 } }"#)
            .unwrap();
    let popover = fx.popover(true).container_style(style);
    fx.render(popover);
    fx.host.settle().unwrap();

    let (panel, _) = fx.panel().unwrap();
    assert_eq!(panel.corner_radius, 4.);
    assert_eq!(panel.background, Color::BLACK);
    assert_eq!(panel.padding, 10.);
}
