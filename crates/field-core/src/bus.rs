//! Small typed publish/subscribe channel.
//!
//! Replaces a page-global broadcast: publishers and subscribers share an
//! `EventBus` handle explicitly, and each subscription is a guard that removes
//! its handler when dropped.

use crate::state::SpeedMode;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Handler<T> = Rc<dyn Fn(&T)>;

struct Subscribers<T> {
    next_id: u64,
    entries: SmallVec<[(u64, Handler<T>); 4]>,
}

pub struct EventBus<T> {
    inner: Rc<RefCell<Subscribers<T>>>,
}

impl<T: 'static> EventBus<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Subscribers {
                next_id: 0,
                entries: SmallVec::new(),
            })),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut subs = self.inner.borrow_mut();
            let id = subs.next_id;
            subs.next_id += 1;
            subs.entries.push((id, Rc::new(handler)));
            id
        };
        let weak: Weak<RefCell<Subscribers<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().entries.retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    /// Delivers `event` to every handler subscribed at the time of the call and
    /// returns how many were invoked. Handlers may subscribe or unsubscribe
    /// while being dispatched; changes apply from the next publish.
    pub fn publish(&self, event: &T) -> usize {
        let handlers: SmallVec<[Handler<T>; 4]> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Keeps a handler registered for as long as it is alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Hyperdrive switch raised by a control outside the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HyperdriveToggle {
    pub active: bool,
}

impl HyperdriveToggle {
    /// Builds a toggle from a possibly missing or malformed `active` flag.
    /// Anything that is not an explicit boolean counts as inactive.
    #[inline]
    pub fn from_payload(active: Option<bool>) -> Self {
        Self {
            active: active.unwrap_or(false),
        }
    }

    #[inline]
    pub fn mode(self) -> SpeedMode {
        SpeedMode::from_active(self.active)
    }
}

pub type ControlBus = EventBus<HyperdriveToggle>;
