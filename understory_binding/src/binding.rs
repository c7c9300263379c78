// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding engine: bind, re-bind, relay and unbind.
//!
//! Binding source key `k` of object `S` to key `t` of object `T` does four
//! things:
//!
//! 1. Subscribes to `T`'s change event for `t`. When it fires, `S` publishes
//!    its own change events for `k`. The value itself is never copied; the
//!    next [`Object::get`] on `S` reads through to `T`.
//! 2. Subscribes to `T`'s before-change event. When it fires *for `t`*, `S`
//!    publishes a before-change event for `k`. Other keys are ignored, which
//!    keeps relays correct along chains whose hops use different keys.
//! 3. Installs an accessor for `k` on `S`, pointing (weakly) at `T`/`t`.
//! 4. Publishes the change events for `k` on `S` right away.
//!
//! Chains compose: in `A.x -> B.y -> C.z`, a write on `C.z` notifies `B.y`
//! through the first relay, and that notification reaches `A.x` through the
//! second, depth-first and in that order.
//!
//! The engine does not detect cycles; see
//! [`ObjectBuilder::max_depth`](crate::ObjectBuilder::max_depth).

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::Key;
use crate::accessor::{Accessor, Transforms};
use crate::notify::PropertyListener;
use crate::object::{Object, WeakObject};
use crate::value::Value;

/// Live relay listeners of an object, keyed by source key.
#[derive(Default)]
pub(crate) struct SubscriptionTable {
    /// Relays the target's change event.
    change: HashMap<Key, PropertyListener>,
    /// Relays the target's before-change event, filtered by target key.
    before_change: HashMap<Key, PropertyListener>,
}

impl fmt::Debug for SubscriptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionTable")
            .field("change", &self.change.len())
            .field("before_change", &self.before_change.len())
            .finish()
    }
}

impl Object {
    /// Binds `key` on this object to the same key on `target`.
    ///
    /// Shorthand for [`Object::bind_to_key`] with `target_key == key`.
    pub fn bind_to(&self, key: &str, target: &Self) -> Binding {
        self.bind_to_key(key, target, key)
    }

    /// Binds `key` on this object to `target_key` on `target`.
    ///
    /// Any previous binding of `key` is released first. After this call,
    /// reads of `key` come from `target_key`, writes go to it, and its change
    /// and before-change events are relayed as events for `key`. Change
    /// events for `key` fire immediately.
    ///
    /// `target` is held weakly: it must outlive the binding, or be unbound
    /// first. Once it is gone, reads yield `None` and writes are dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use understory_binding::Object;
    ///
    /// let view = Object::new();
    /// view.set_as("resolution", 2.0_f64);
    ///
    /// let layer = Object::new();
    /// layer
    ///     .bind_to_key("scale", &view, "resolution")
    ///     .transform(
    ///         |v| v.map(|s: &f64| s * 10.0),
    ///         |v| v.map(|r: &f64| r / 10.0),
    ///     );
    ///
    /// assert_eq!(layer.get_as::<f64>("scale"), Some(0.2));
    /// layer.set_as("scale", 0.5_f64);
    /// assert_eq!(view.get_as::<f64>("resolution"), Some(5.0));
    /// ```
    pub fn bind_to_key(&self, key: &str, target: &Self, target_key: &str) -> Binding {
        self.unbind(key);

        let key: Key = Rc::from(key);
        let target_key: Key = Rc::from(target_key);

        let change_relay = {
            let source = self.downgrade();
            let key = key.clone();
            target.listen(target.change_event_type(&target_key), move |_| {
                if let Some(source) = source.upgrade() {
                    source.relay_change(&key);
                }
            })
        };
        let before_change_relay = {
            let source = self.downgrade();
            let key = key.clone();
            let watched = target_key.clone();
            target.on_before_property_change(move |event| {
                if event.key() != Some(&*watched) {
                    return;
                }
                if let Some(source) = source.upgrade() {
                    source.relay_before_change(&key);
                }
            })
        };

        let id = self.inner.next_binding.get();
        self.inner.next_binding.set(id + 1);

        let replaced = self.inner.values.borrow_mut().remove(&key);
        self.inner.accessors.borrow_mut().insert(
            key.clone(),
            Accessor::new(target.downgrade(), target_key.clone(), id),
        );
        {
            let mut subscriptions = self.inner.subscriptions.borrow_mut();
            subscriptions.change.insert(key.clone(), change_relay);
            subscriptions
                .before_change
                .insert(key.clone(), before_change_relay);
        }
        drop(replaced);

        tracing::debug!(key = %key, target_key = %target_key, binding = id, "bound property");
        self.notify_change(&key);

        Binding {
            source: self.downgrade(),
            source_key: key,
            target_key,
            id,
        }
    }

    /// Releases the binding of `key`, if any.
    ///
    /// The value observed through the binding is stored locally, so
    /// [`Object::get`] returns the same value before and after, and no change
    /// event fires. Later writes to `key` stay local. Unbinding an unbound key
    /// does nothing.
    pub fn unbind(&self, key: &str) {
        let change_relay = self.inner.subscriptions.borrow_mut().change.remove(key);
        if let Some(listener) = change_relay {
            listener.unsubscribe();
            let accessor = self.inner.accessors.borrow_mut().remove(key);
            let value = accessor
                .as_ref()
                .and_then(|accessor| self.read_through(key, accessor));
            self.inner.values.borrow_mut().insert(key, value);
            tracing::debug!(key, binding = ?accessor.as_ref().map(|a| a.id), "unbound property");
        }

        let before_change_relay = self
            .inner
            .subscriptions
            .borrow_mut()
            .before_change
            .remove(key);
        if let Some(listener) = before_change_relay {
            listener.unsubscribe();
        }
    }

    /// Releases every binding on this object. See [`Object::unbind`].
    pub fn unbind_all(&self) {
        for key in self.bound_keys() {
            self.unbind(&key);
        }
    }

    /// Returns `true` if `key` is currently bound.
    #[must_use]
    pub fn is_bound(&self, key: &str) -> bool {
        self.inner.accessors.borrow().contains(key)
    }

    /// Returns the keys that currently have a binding relay.
    #[must_use]
    pub fn bound_keys(&self) -> Vec<Key> {
        self.inner
            .subscriptions
            .borrow()
            .change
            .keys()
            .cloned()
            .collect()
    }

    fn relay_change(&self, key: &str) {
        let Some(_guard) = self.enter("relay change", key) else {
            return;
        };
        self.notify_change(key);
    }

    fn relay_before_change(&self, key: &str) {
        let Some(_guard) = self.enter("relay before-change", key) else {
            return;
        };
        self.before_change(key);
    }
}

/// Handle returned by [`Object::bind_to`] and [`Object::bind_to_key`].
///
/// The handle refers to one particular binding. Once that binding is released
/// or replaced by a later `bind_to` of the same key, the handle is inert.
/// Dropping the handle does not unbind.
pub struct Binding {
    source: WeakObject,
    source_key: Key,
    target_key: Key,
    id: u64,
}

impl Binding {
    /// The bound key on the source object.
    #[must_use]
    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    /// The key on the target object.
    #[must_use]
    pub fn target_key(&self) -> &str {
        &self.target_key
    }

    /// Returns `true` while this binding is installed on a live source.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.source.upgrade().is_some_and(|source| {
            source
                .inner
                .accessors
                .borrow()
                .get(&self.source_key)
                .is_some_and(|a| a.id == self.id)
        })
    }

    /// Replaces the binding's transforms and republishes the source key's
    /// change events.
    ///
    /// `forward` maps values written on the source key before they reach the
    /// target; `reverse` maps values read from the target. Returns `false`,
    /// doing nothing, if the binding is no longer active.
    pub fn transform<F, R>(&self, forward: F, reverse: R) -> bool
    where
        F: Fn(Value) -> Value + 'static,
        R: Fn(Value) -> Value + 'static,
    {
        let Some(source) = self.source.upgrade() else {
            return false;
        };
        let previous = source.inner.accessors.borrow_mut().replace_transforms(
            &self.source_key,
            self.id,
            Transforms::new(Rc::new(forward), Rc::new(reverse)),
        );
        let Some(previous) = previous else {
            return false;
        };
        drop(previous);
        source.notify_change(&self.source_key);
        true
    }

    /// Releases this binding if it is still active.
    ///
    /// Returns `true` if it was.
    pub fn unbind(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.source.upgrade() {
            Some(source) => {
                source.unbind(&self.source_key);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("source_key", &self.source_key)
            .field("target_key", &self.target_key)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
