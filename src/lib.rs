//! A popover component and the host it runs in.
//!
//! The view framework itself lives in [`perch_core`]; this crate adds a [`Host`] that runs the
//! event loop against a [`Backend`](perch_core::backend::Backend), an in-memory [`Headless`]
//! backend, serde-configurable [`Style`] maps, and the [`Popover`] view.

pub mod headless;
mod host;
pub mod popover;
pub mod style;

pub use headless::{Headless, HeadlessError};
pub use host::{Host, HostError};
pub use perch_core;
pub use perch_core::events::Callback;
pub use perch_core::{Color, Context, Layer, NodeRef, State, View};
pub use popover::Popover;
pub use style::{BoxShadow, Style};
