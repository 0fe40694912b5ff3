//! Events.

use cgmath::Point2;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    /// A key press without modifiers.
    pub fn new(code: KeyCode) -> Key {
        Key {
            code,
            modifiers: KeyModifiers::default(),
        }
    }
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    /// Whether any shift key is pressed.
    pub shift: bool,

    /// Whether any control key is pressed.
    pub control: bool,

    /// Whether any option key or alt key is pressed.
    pub option: bool,

    /// Whether any command key or meta key is pressed.
    pub command: bool,
}

/// Keyboard layout-independent identifiers for keyboard keys.
///
/// Printable keys are folded into `Char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Return,
    Tab,
    Space,
    Delete,
    ForwardDelete,
    Escape,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    Home,
    End,
    PageUp,
    PageDown,
    Function(u8),
}

/// A pointer press, in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub location: Point2<f64>,
}

impl Pointer {
    pub fn at(x: f64, y: f64) -> Pointer {
        Pointer {
            location: Point2::new(x, y),
        }
    }
}

/// A shared event handler attached to a native view.
///
/// Two handlers are equal only if they are the same allocation.
pub struct EventHandler<T>(Arc<Mutex<dyn FnMut(&T) + Send>>);

impl<T> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl<T> EventHandler<T> {
    pub fn new<F: 'static + FnMut(&T) + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    pub fn call(&self, event: &T) {
        (self.0.lock())(event)
    }
}

impl<T> PartialEq for EventHandler<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler<{}>", std::any::type_name::<T>())
    }
}

/// A zero-argument callback passed down as a view property.
///
/// Identity is the allocation: cloning keeps it, wrapping the same closure again does not.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    pub fn new<F: 'static + Fn() + Send + Sync>(f: F) -> Self {
        Callback(Arc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}
