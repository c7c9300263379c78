// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener registry and dispatch.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Inline capacity for the listeners of one event type.
///
/// Most event types on an object have one or two listeners (typically a
/// binding relay plus an observer).
const INLINE_LISTENERS: usize = 2;

/// Inline capacity of the snapshot taken at dispatch time.
const INLINE_SNAPSHOT: usize = 4;

struct Entry<P> {
    id: u64,
    active: Cell<bool>,
    handler: Box<dyn Fn(&P)>,
}

struct Registry<T, P> {
    next_id: u64,
    by_type: HashMap<T, SmallVec<[Rc<Entry<P>>; INLINE_LISTENERS]>>,
}

impl<T, P> Registry<T, P> {
    fn len(&self) -> usize {
        self.by_type.values().map(SmallVec::len).sum()
    }
}

/// A synchronous, single-threaded event target.
///
/// See the [crate documentation](crate) for the dispatch model.
pub struct EventTarget<T, P> {
    registry: Rc<RefCell<Registry<T, P>>>,
}

impl<T, P> Default for EventTarget<T, P> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                by_type: HashMap::new(),
            })),
        }
    }
}

impl<T, P> fmt::Debug for EventTarget<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventTarget")
            .field("event_types", &registry.by_type.len())
            .field("listeners", &registry.len())
            .finish_non_exhaustive()
    }
}

impl<T, P> EventTarget<T, P>
where
    T: Clone + Eq + Hash,
    P: 'static,
{
    /// Creates a target with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type`.
    ///
    /// The handler stays registered until the returned [`Listener`] is
    /// dropped or explicitly unsubscribed.
    #[must_use = "dropping the listener unsubscribes the handler immediately"]
    pub fn subscribe<F>(&self, event_type: T, handler: F) -> Listener<T, P>
    where
        F: Fn(&P) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .by_type
            .entry(event_type.clone())
            .or_default()
            .push(Rc::new(Entry {
                id,
                active: Cell::new(true),
                handler: Box::new(handler),
            }));
        tracing::trace!(listener = id, "listener subscribed");
        Listener {
            registry: Rc::downgrade(&self.registry),
            event_type,
            id,
        }
    }

    /// Invokes every handler registered for `event_type` with `payload`.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, event_type: &T, payload: &P) -> usize {
        let snapshot: SmallVec<[Rc<Entry<P>>; INLINE_SNAPSHOT]> = {
            let registry = self.registry.borrow();
            match registry.by_type.get(event_type) {
                Some(entries) => entries.iter().cloned().collect(),
                None => return 0,
            }
        };
        let mut invoked = 0;
        for entry in &snapshot {
            // Unsubscribed by an earlier handler in this same dispatch.
            if !entry.active.get() {
                continue;
            }
            (entry.handler)(payload);
            invoked += 1;
        }
        invoked
    }

    /// Returns the number of handlers registered for `event_type`.
    #[must_use]
    pub fn listener_count(&self, event_type: &T) -> usize {
        self.registry
            .borrow()
            .by_type
            .get(event_type)
            .map_or(0, SmallVec::len)
    }

    /// Returns `true` if at least one handler is registered for `event_type`.
    #[must_use]
    pub fn has_listeners(&self, event_type: &T) -> bool {
        self.listener_count(event_type) > 0
    }

    /// Returns the total number of registered handlers across all event types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.borrow().by_type.is_empty()
    }
}

/// Handle for one registered handler.
///
/// Dropping the handle unsubscribes the handler. It holds only a weak
/// reference to its [`EventTarget`].
pub struct Listener<T, P>
where
    T: Eq + Hash,
{
    registry: Weak<RefCell<Registry<T, P>>>,
    event_type: T,
    id: u64,
}

impl<T, P> Listener<T, P>
where
    T: Eq + Hash,
{
    /// Returns the event type this listener was registered for.
    #[must_use]
    pub fn event_type(&self) -> &T {
        &self.event_type
    }

    /// Returns `true` while the handler is still registered on a live target.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            registry
                .borrow()
                .by_type
                .get(&self.event_type)
                .is_some_and(|entries| entries.iter().any(|e| e.id == self.id))
        })
    }

    /// Removes the handler from its target.
    ///
    /// Returns `true` if the handler was still registered.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        self.registry = Weak::new();

        let removed = {
            let mut registry = registry.borrow_mut();
            let Some(entries) = registry.by_type.get_mut(&self.event_type) else {
                return false;
            };
            let removed = entries
                .iter()
                .position(|e| e.id == self.id)
                .map(|index| entries.remove(index));
            if entries.is_empty() {
                registry.by_type.remove(&self.event_type);
            }
            removed
        };

        // The entry (and whatever its handler captured) is dropped after the
        // registry borrow ends.
        match removed {
            Some(entry) => {
                entry.active.set(false);
                tracing::trace!(listener = self.id, "listener unsubscribed");
                true
            }
            None => false,
        }
    }
}

impl<T, P> Drop for Listener<T, P>
where
    T: Eq + Hash,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, P> fmt::Debug for Listener<T, P>
where
    T: Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("event_type", &self.event_type)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
