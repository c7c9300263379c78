// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accessors: the record that redirects a bound key to another object.

use alloc::rc::Rc;
use core::fmt;

use hashbrown::HashMap;

use crate::Key;
use crate::object::WeakObject;
use crate::value::Value;

/// A binding transform.
///
/// Transforms are never applied to an absent value.
pub type Transform = Rc<dyn Fn(Value) -> Value>;

/// The forward/reverse pair of a binding. `None` is the identity.
#[derive(Clone, Default)]
pub(crate) struct Transforms {
    forward: Option<Transform>,
    reverse: Option<Transform>,
}

impl Transforms {
    pub(crate) fn new(forward: Transform, reverse: Transform) -> Self {
        Self {
            forward: Some(forward),
            reverse: Some(reverse),
        }
    }
}

/// Delegation of one source key to `target_key` on `target`.
#[derive(Clone)]
pub(crate) struct Accessor {
    pub(crate) target: WeakObject,
    pub(crate) target_key: Key,
    /// Distinguishes successive bindings of the same source key.
    pub(crate) id: u64,
    transforms: Transforms,
}

impl Accessor {
    pub(crate) fn new(target: WeakObject, target_key: Key, id: u64) -> Self {
        Self {
            target,
            target_key,
            id,
            transforms: Transforms::default(),
        }
    }

    /// Maps a value written on the source key to the value pushed to the target.
    pub(crate) fn forward(&self, value: Value) -> Value {
        match &self.transforms.forward {
            Some(f) => f(value),
            None => value,
        }
    }

    /// Maps a value read from the target to the value exposed on the source key.
    pub(crate) fn reverse(&self, value: Value) -> Value {
        match &self.transforms.reverse {
            Some(f) => f(value),
            None => value,
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("target_key", &self.target_key)
            .field("id", &self.id)
            .field("target_alive", &self.target.upgrade().is_some())
            .field("has_forward", &self.transforms.forward.is_some())
            .field("has_reverse", &self.transforms.reverse.is_some())
            .finish()
    }
}

/// Per-object accessors, keyed by source key.
#[derive(Debug, Default)]
pub(crate) struct AccessorTable {
    entries: HashMap<Key, Accessor>,
}

impl AccessorTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Accessor> {
        self.entries.get(key)
    }

    pub(crate) fn insert(&mut self, key: Key, accessor: Accessor) -> Option<Accessor> {
        self.entries.insert(key, accessor)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Accessor> {
        self.entries.remove(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.entries.keys()
    }

    /// Swaps in `transforms` if `key` is still bound by binding `id`.
    ///
    /// Returns the replaced pair so the caller can drop it outside any borrow.
    pub(crate) fn replace_transforms(
        &mut self,
        key: &str,
        id: u64,
        transforms: Transforms,
    ) -> Option<Transforms> {
        let accessor = self.entries.get_mut(key).filter(|a| a.id == id)?;
        Some(core::mem::replace(&mut accessor.transforms, transforms))
    }
}
