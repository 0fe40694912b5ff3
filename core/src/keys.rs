//! Global key subscriptions.
//!
//! Key presses are not routed through the view hierarchy: every subscriber receives every press.
//! A [`Subscription`] is the only handle to its entry and removes it when dropped, so a view that
//! keeps its subscription in its state can never leak a listener past its own lifetime.

use crate::events::Key;
use crate::view::ViewId;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

pub(crate) type KeyHandler = Arc<dyn Fn(&Key) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, (ViewId, KeyHandler)>,
}

/// The registry of key subscribers.
#[derive(Clone, Default)]
pub struct KeyListeners {
    inner: Arc<Mutex<Listeners>>,
}

impl KeyListeners {
    pub fn new() -> KeyListeners {
        KeyListeners::default()
    }

    /// Adds a subscriber owned by the given view.
    pub fn subscribe<F>(&self, owner: ViewId, handler: F) -> Subscription
    where
        F: 'static + Fn(&Key) + Send + Sync,
    {
        let mut listeners = self.inner.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, (owner, Arc::new(handler)));
        log::trace!("key subscription {} added for {:?}", id, owner);

        Subscription {
            id,
            owner,
            listeners: Arc::downgrade(&self.inner),
        }
    }

    /// Calls every subscriber with the key.
    ///
    /// Handlers are collected before any of them runs, so they may subscribe or unsubscribe.
    pub fn dispatch(&self, key: &Key) {
        let handlers: Vec<KeyHandler> = self
            .inner
            .lock()
            .entries
            .values()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(key);
        }
    }

    /// Total number of live subscriptions.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live subscriptions owned by a view.
    pub fn count_for(&self, owner: ViewId) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|(view, _)| *view == owner)
            .count()
    }
}

/// An active key subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    owner: ViewId,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn owner(&self) -> ViewId {
        self.owner
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().entries.remove(&self.id);
            log::trace!("key subscription {} removed for {:?}", self.id, self.owner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::KeyCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(listeners: &KeyListeners, owner: ViewId) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let sub = {
            let count = Arc::clone(&count);
            listeners.subscribe(owner, move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        (count, sub)
    }

    #[test]
    fn every_subscriber_receives_each_press_once() {
        let listeners = KeyListeners::new();
        let (a, _sub_a) = counter(&listeners, ViewId::new());
        let (b, _sub_b) = counter(&listeners, ViewId::new());

        listeners.dispatch(&Key::new(KeyCode::Escape));
        listeners.dispatch(&Key::new(KeyCode::Char('x')));

        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let listeners = KeyListeners::new();
        let owner = ViewId::new();
        let (count, sub) = counter(&listeners, owner);
        assert_eq!(listeners.count_for(owner), 1);

        drop(sub);
        listeners.dispatch(&Key::new(KeyCode::Escape));

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(listeners.is_empty());
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let listeners = KeyListeners::new();
        let (_, sub) = counter(&listeners, ViewId::new());
        drop(listeners);
        drop(sub);
    }

    #[test]
    fn handler_may_unsubscribe_during_dispatch() {
        let listeners = KeyListeners::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let sub = {
            let slot = Arc::clone(&slot);
            listeners.subscribe(ViewId::new(), move |_| {
                slot.lock().take();
            })
        };
        *slot.lock() = Some(sub);

        listeners.dispatch(&Key::new(KeyCode::Escape));
        assert!(listeners.is_empty());
    }
}
