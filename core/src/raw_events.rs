//! Events as they arrive from the platform, before dispatch.

use crate::events::{Key, Pointer};
use cgmath::Vector2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    /// A key was pressed. Delivered to every key subscriber.
    Key(Key),
    /// A pointer was pressed. Delivered to the topmost view under the pointer.
    Pointer(Pointer),
    /// The window content area changed size.
    Resize(Vector2<f64>),
}
