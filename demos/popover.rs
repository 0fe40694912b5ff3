//! Opens a popover from a button in a headless window and closes it again, printing the scene
//! after every step.
//!
//! Run with `RUST_LOG=debug` to see what the popover does.

use cgmath::Vector2;
use parking_lot::Mutex;
use perch::perch_core::events::{EventHandler, Key, KeyCode, Pointer};
use perch::perch_core::raw_events::RawEvent;
use perch::perch_core::Fragment;
use perch::{Callback, Color, Headless, Host, HostError, Layer, NodeRef, Popover, Style, View};
use std::sync::Arc;

/// Everything the window shows.
struct App {
    open: Arc<Mutex<bool>>,
    anchor: NodeRef,
    toggle: EventHandler<Pointer>,
    on_close: Callback,
    menu: Arc<dyn View<()>>,
}

impl App {
    fn new() -> App {
        let open = Arc::new(Mutex::new(false));
        let toggle = {
            let open = Arc::clone(&open);
            EventHandler::new(move |_: &Pointer| {
                let mut open = open.lock();
                *open = !*open;
            })
        };
        let on_close = {
            let open = Arc::clone(&open);
            Callback::new(move || *open.lock() = false)
        };
        let items: Fragment<()> = (0..3)
            .map(|i| -> Arc<dyn View<()>> {
                Arc::new(Layer {
                    background: Color::rgba8(230, 230, 240, 1.),
                    corner_radius: 4.,
                    ..Layer::<()>::at(0., f64::from(i) * 28., 160., 24.)
                })
            })
            .collect();

        App {
            open,
            anchor: NodeRef::new(),
            toggle,
            on_close,
            menu: Arc::new(items),
        }
    }

    fn view(&self) -> Arc<dyn View<()>> {
        let button: Arc<dyn View<()>> = Arc::new(Layer {
            background: Color::rgba8(40, 110, 250, 1.),
            corner_radius: 6.,
            node_ref: Some(self.anchor.clone()),
            pointer_action: Some(self.toggle.clone()),
            ..Layer::<()>::at(520., 20., 80., 32.)
        });
        let popover = Popover::new(
            Arc::clone(&self.menu),
            self.anchor.clone(),
            self.on_close.clone(),
        )
        .open(*self.open.lock())
        .container_style(Style {
            corner_radius: Some(8.),
            ..Style::default()
        });

        let root: Fragment<()> = vec![button, Arc::new(popover)];
        Arc::new(root)
    }
}

fn step(host: &mut Host<Headless>, app: &App, label: &str) -> Result<(), HostError> {
    host.poll()?;
    // callbacks only flip the flag; render whatever it says now
    host.render(app.view())?;
    host.settle()?;
    println!("-- {}\n{}", label, host.backend().outline());
    Ok(())
}

fn main() -> Result<(), HostError> {
    env_logger::init();

    let app = App::new();
    let mut host = Host::new(Headless::new(), Vector2::new(640., 480.), ());
    let events = host.event_sender();

    host.render(app.view())?;
    step(&mut host, &app, "initial")?;

    let _ = events.send(RawEvent::Pointer(Pointer::at(540., 30.)));
    step(&mut host, &app, "button pressed")?;

    let _ = events.send(RawEvent::Key(Key::new(KeyCode::Escape)));
    step(&mut host, &app, "escape pressed")?;

    let _ = events.send(RawEvent::Pointer(Pointer::at(540., 30.)));
    step(&mut host, &app, "button pressed again")?;

    let _ = events.send(RawEvent::Pointer(Pointer::at(20., 400.)));
    step(&mut host, &app, "backdrop pressed")?;

    Ok(())
}
