// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object storage for unbound property values.
//!
//! [`PropertyStore`] holds the values of every key that is *not* currently
//! bound. Bound keys live in the [`AccessorTable`](crate::accessor::AccessorTable)
//! instead; the object keeps the two tables disjoint.
//!
//! An entry may hold "no value". That is what an unbind leaves behind when the
//! bound property had no value, so the key remains enumerable.

use alloc::rc::Rc;

use hashbrown::HashMap;

use crate::Key;
use crate::value::Value;

#[derive(Debug, Default)]
pub(crate) struct PropertyStore {
    entries: HashMap<Key, Option<Value>>,
}

impl PropertyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the stored value, flattening "present but empty" to `None`.
    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    /// Stores `value` under `key`, reusing the existing key allocation.
    ///
    /// Returns the previous entry, if the key was present.
    pub(crate) fn insert(&mut self, key: &str, value: Option<Value>) -> Option<Option<Value>> {
        match self.entries.get_mut(key) {
            Some(slot) => Some(core::mem::replace(slot, value)),
            None => {
                self.entries.insert(Rc::from(key), value);
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Option<Value>> {
        self.entries.remove(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.entries.keys()
    }
}
