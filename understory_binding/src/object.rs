// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable property objects.
//!
//! [`Object`] is the public face of the engine: a shared handle to a set of
//! keyed properties that publishes change events and can delegate any key to
//! another object (see [`Object::bind_to`]).

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use hashbrown::HashMap;

use crate::Key;
use crate::accessor::{Accessor, AccessorTable};
use crate::binding::SubscriptionTable;
use crate::error::TypeMismatch;
use crate::notify::{
    ChangeNotifier, EventType, PropertyEvent, PropertyEventTarget, PropertyListener,
};
use crate::store::PropertyStore;
use crate::typed::{TypedAccessors, Untyped};
use crate::value::Value;

/// Snapshot of an object's properties, as returned by [`Object::properties`].
///
/// A key maps to `None` when it is present but holds no value.
pub type Properties = HashMap<Key, Option<Value>>;

pub(crate) struct ObjectInner {
    pub(crate) values: RefCell<PropertyStore>,
    pub(crate) accessors: RefCell<AccessorTable>,
    pub(crate) subscriptions: RefCell<SubscriptionTable>,
    pub(crate) events: PropertyEventTarget,
    pub(crate) notifier: ChangeNotifier,
    pub(crate) next_binding: Cell<u64>,
    typed: &'static dyn TypedAccessors,
    depth: Cell<usize>,
    max_depth: Option<usize>,
}

/// A shared handle to an observable set of keyed properties.
///
/// Cloning the handle is cheap and yields the same object; identity is
/// reference identity ([`Object::ptr_eq`]).
///
/// Unbound keys store their value locally. Bound keys (see
/// [`Object::bind_to`]) delegate reads and writes to a key on another object.
///
/// All notification is synchronous. No internal borrow is held while a
/// handler runs, so handlers may read, write, bind and unbind freely.
///
/// # Example
///
/// ```rust
/// use core::cell::Cell;
/// use std::rc::Rc;
/// use understory_binding::{Object, Value};
///
/// let view = Object::new();
/// let changes = Rc::new(Cell::new(0));
///
/// let seen = changes.clone();
/// let _listener = view.on_change("zoom", move |_| seen.set(seen.get() + 1));
///
/// view.set("zoom", Value::new(4_u8));
/// assert_eq!(view.get_as::<u8>("zoom"), Some(4));
/// assert_eq!(changes.get(), 1);
/// assert!(view.get("missing").is_none());
/// ```
#[derive(Clone)]
pub struct Object {
    pub(crate) inner: Rc<ObjectInner>,
}

/// A non-owning reference to an [`Object`].
#[derive(Clone, Default)]
pub struct WeakObject {
    inner: Weak<ObjectInner>,
}

impl WeakObject {
    /// Returns the object if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Object> {
        self.inner.upgrade().map(|inner| Object { inner })
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObject")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Decrements the re-entrancy depth of an object when dropped.
pub(crate) struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Object {
    /// Creates an empty object with no typed accessors.
    #[must_use]
    pub fn new() -> Self {
        ObjectBuilder::new().into_object()
    }

    /// Returns a builder for configuring initial values, typed accessors and
    /// the re-entrancy limit.
    #[must_use]
    pub fn builder() -> ObjectBuilder {
        ObjectBuilder::new()
    }

    /// Returns a non-owning reference to this object.
    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns this object's typed accessor table.
    #[must_use]
    pub fn typed_accessors(&self) -> &'static dyn TypedAccessors {
        self.inner.typed
    }

    /// Returns the event target carrying this object's property events.
    #[must_use]
    pub fn events(&self) -> &PropertyEventTarget {
        &self.inner.events
    }

    /// Returns the canonical change event for `key`.
    #[must_use]
    pub fn change_event_type(&self, key: &str) -> EventType {
        self.inner.notifier.change_event_type(key)
    }

    // =========================================================================
    // Get / set / notify
    // =========================================================================

    /// Returns the current value of `key`.
    ///
    /// For a bound key this reads the target key (through the target's typed
    /// getter when it declares one) and applies the reverse transform.
    /// Returns `None` if the key has no value, or if it is bound to an object
    /// that no longer exists.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let accessor = self.inner.accessors.borrow().get(key).cloned();
        match accessor {
            Some(accessor) => {
                let _guard = self.enter("get", key)?;
                self.read_through(key, &accessor)
            }
            None => self.inner.values.borrow().get(key).cloned(),
        }
    }

    /// Returns the value of `key` downcast to `T`.
    ///
    /// `None` if the key has no value or holds another type.
    #[must_use]
    pub fn get_as<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| value.get::<T>())
    }

    /// Sets `key` to `value`.
    ///
    /// Publishes [`EventType::BeforePropertyChange`] first. An unbound key
    /// then stores the value and publishes its change events. A bound key
    /// applies the forward transform and writes the target key instead; its
    /// change events arrive back through the binding.
    ///
    /// A write to a key bound to a dropped object is discarded before any
    /// event fires.
    pub fn set(&self, key: &str, value: Value) {
        let Some(_guard) = self.enter("set", key) else {
            return;
        };
        let accessor = self.inner.accessors.borrow().get(key).cloned();
        let Some(accessor) = accessor else {
            self.before_change(key);
            self.inner.values.borrow_mut().insert(key, Some(value));
            self.notify_change(key);
            return;
        };
        let Some(target) = accessor.target.upgrade() else {
            tracing::warn!(key, "write to a binding whose target was dropped");
            return;
        };
        self.before_change(key);
        let value = accessor.forward(value);
        target.write_property(&accessor.target_key, value);
    }

    /// Sets `key` to a concrete value. Shorthand for `set(key, Value::new(value))`.
    pub fn set_as<T: Clone + 'static>(&self, key: &str, value: T) {
        self.set(key, Value::new(value));
    }

    /// Republishes the change events for `key` without changing it.
    ///
    /// For a bound key the request is forwarded to the target, so the object
    /// holding the value re-broadcasts and the relay carries it back.
    pub fn notify(&self, key: &str) {
        let Some(_guard) = self.enter("notify", key) else {
            return;
        };
        let accessor = self.inner.accessors.borrow().get(key).cloned();
        match accessor {
            Some(accessor) => match accessor.target.upgrade() {
                Some(target) => target.notify(&accessor.target_key),
                None => tracing::warn!(key, "notify on a binding whose target was dropped"),
            },
            None => self.notify_change(key),
        }
    }

    /// Applies each `(key, value)` in order.
    ///
    /// Keys with a typed setter on this object's type go through it; all
    /// others use [`Object::set`]. Stops at the first typed setter failure;
    /// earlier updates stay applied.
    pub fn set_values<I, K>(&self, values: I) -> Result<(), TypeMismatch>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        for (key, value) in values {
            let key = key.as_ref();
            match self.inner.typed.setter(key) {
                Some(setter) => setter(self, value)?,
                None => self.set(key, value),
            }
        }
        Ok(())
    }

    /// Returns every key that is stored locally or bound, each once.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        let values = self.inner.values.borrow();
        let accessors = self.inner.accessors.borrow();
        let mut keys: Vec<Key> = Vec::with_capacity(values.len() + accessors.len());
        keys.extend(values.keys().cloned());
        keys.extend(
            accessors
                .keys()
                .filter(|key| !values.contains(key))
                .cloned(),
        );
        keys
    }

    /// Returns the current value of every key in [`Object::keys`].
    #[must_use]
    pub fn properties(&self) -> Properties {
        self.keys()
            .into_iter()
            .map(|key| {
                let value = self.get(&key);
                (key, value)
            })
            .collect()
    }

    // =========================================================================
    // Listening
    // =========================================================================

    /// Registers `handler` for `event_type` on this object.
    #[must_use = "dropping the listener unsubscribes the handler immediately"]
    pub fn listen<F>(&self, event_type: EventType, handler: F) -> PropertyListener
    where
        F: Fn(&PropertyEvent) + 'static,
    {
        self.inner.events.subscribe(event_type, handler)
    }

    /// Registers `handler` for changes of `key` (case-insensitive).
    #[must_use = "dropping the listener unsubscribes the handler immediately"]
    pub fn on_change<F>(&self, key: &str, handler: F) -> PropertyListener
    where
        F: Fn(&PropertyEvent) + 'static,
    {
        self.listen(self.change_event_type(key), handler)
    }

    /// Registers `handler` for changes of any key.
    #[must_use = "dropping the listener unsubscribes the handler immediately"]
    pub fn on_property_change<F>(&self, handler: F) -> PropertyListener
    where
        F: Fn(&PropertyEvent) + 'static,
    {
        self.listen(EventType::PropertyChange, handler)
    }

    /// Registers `handler` to run before any key changes.
    #[must_use = "dropping the listener unsubscribes the handler immediately"]
    pub fn on_before_property_change<F>(&self, handler: F) -> PropertyListener
    where
        F: Fn(&PropertyEvent) + 'static,
    {
        self.listen(EventType::BeforePropertyChange, handler)
    }

    // =========================================================================
    // Internals shared with the binding engine
    // =========================================================================

    /// Publishes the change events for `key` on this object.
    pub(crate) fn notify_change(&self, key: &str) {
        self.inner.notifier.notify_change(&self.inner.events, key);
    }

    /// Publishes the before-change event for `key` on this object.
    pub(crate) fn before_change(&self, key: &str) {
        self.inner.notifier.before_change(&self.inner.events, key);
    }

    /// Reads a bound key through `accessor` once, without the depth guard.
    pub(crate) fn read_through(&self, key: &str, accessor: &Accessor) -> Option<Value> {
        let Some(target) = accessor.target.upgrade() else {
            tracing::warn!(key, "read from a binding whose target was dropped");
            return None;
        };
        let value = target.read_property(&accessor.target_key)?;
        Some(accessor.reverse(value))
    }

    /// Reads `key` the way a binding does: typed getter first.
    fn read_property(&self, key: &str) -> Option<Value> {
        match self.inner.typed.getter(key) {
            Some(getter) => getter(self),
            None => self.get(key),
        }
    }

    /// Writes `key` the way a binding does: typed setter first.
    fn write_property(&self, key: &str, value: Value) {
        match self.inner.typed.setter(key) {
            Some(setter) => {
                if let Err(err) = setter(self, value) {
                    tracing::warn!(key, %err, "typed setter rejected a bound write");
                }
            }
            None => self.set(key, value),
        }
    }

    /// Enters one level of re-entrant work on this object.
    ///
    /// Returns `None`, and logs, once the configured depth limit is reached.
    pub(crate) fn enter(&self, op: &'static str, key: &str) -> Option<DepthGuard<'_>> {
        let depth = &self.inner.depth;
        let next = depth.get() + 1;
        if let Some(limit) = self.inner.max_depth
            && next > limit
        {
            tracing::warn!(op, key, limit, "re-entrancy depth limit reached, skipping");
            return None;
        }
        depth.set(next);
        Some(DepthGuard { depth })
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.inner.values.try_borrow().ok().map(|v| v.len());
        let bound = self.inner.accessors.try_borrow().ok().map(|a| a.len());
        f.debug_struct("Object")
            .field("ptr", &Rc::as_ptr(&self.inner))
            .field("values", &values)
            .field("bound", &bound)
            .field("listeners", &self.inner.events.len())
            .field("max_depth", &self.inner.max_depth)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Object`].
///
/// # Example
///
/// ```rust
/// use understory_binding::{Object, Value};
///
/// let layer = Object::builder()
///     .value("opacity", Value::new(0.5_f64))
///     .value("visible", Value::new(true))
///     .max_depth(32)
///     .build()
///     .unwrap();
///
/// assert_eq!(layer.get_as::<f64>("opacity"), Some(0.5));
/// assert_eq!(layer.keys().len(), 2);
/// ```
pub struct ObjectBuilder {
    values: Vec<(Key, Value)>,
    typed: &'static dyn TypedAccessors,
    max_depth: Option<usize>,
}

impl fmt::Debug for ObjectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBuilder")
            .field("values", &self.values.len())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl Default for ObjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectBuilder {
    /// Creates a builder with no initial values, no typed accessors and no
    /// depth limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            typed: &Untyped,
            max_depth: None,
        }
    }

    /// Adds an initial value.
    #[must_use]
    pub fn value(mut self, key: &str, value: Value) -> Self {
        self.values.push((Rc::from(key), value));
        self
    }

    /// Adds several initial values, applied in iteration order.
    #[must_use]
    pub fn values<I, K>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        self.values
            .extend(values.into_iter().map(|(k, v)| (Rc::from(k.as_ref()), v)));
        self
    }

    /// Sets the typed accessor table for the object's type.
    #[must_use]
    pub fn accessors(mut self, typed: &'static dyn TypedAccessors) -> Self {
        self.typed = typed;
        self
    }

    /// Caps nested `set`/`notify`/relay work, and reads of bound keys, on the
    /// object at `depth` levels. Reads of locally stored values are never
    /// capped.
    ///
    /// The engine does not detect binding cycles; without a limit a cyclic
    /// binding graph recurses until the stack overflows. With a limit, work
    /// past the cap is skipped and logged.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Builds the object and applies the initial values through
    /// [`Object::set_values`].
    pub fn build(mut self) -> Result<Object, TypeMismatch> {
        let values = core::mem::take(&mut self.values);
        let object = self.into_object();
        object.set_values(values)?;
        Ok(object)
    }

    fn into_object(self) -> Object {
        Object {
            inner: Rc::new(ObjectInner {
                values: RefCell::new(PropertyStore::new()),
                accessors: RefCell::new(AccessorTable::new()),
                subscriptions: RefCell::new(SubscriptionTable::default()),
                events: PropertyEventTarget::new(),
                notifier: ChangeNotifier::new(),
                next_binding: Cell::new(0),
                typed: self.typed,
                depth: Cell::new(0),
                max_depth: self.max_depth,
            }),
        }
    }
}
