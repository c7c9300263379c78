// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-erased property values.
//!
//! Objects store heterogeneous values under string keys, so every value is
//! carried as a [`Value`] and downcast at the edges.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// An opaque, cloneable property value.
///
/// Wraps any `'static + Clone` type together with its type information.
///
/// # Example
///
/// ```rust
/// use understory_binding::Value;
///
/// let value = Value::new(42_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert_eq!(value.get::<i32>(), Some(42));
/// assert_eq!(value.get::<f64>(), None);
///
/// let doubled = value.map(|n: &i32| n * 2);
/// assert_eq!(doubled.get::<i32>(), Some(84));
/// ```
pub struct Value {
    inner: Box<dyn CloneAny>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Value {
    /// Wraps a concrete value.
    #[must_use]
    pub fn new<T: Clone + 'static>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the wrapped value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name of the wrapped value, for diagnostics.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrows the wrapped value as a `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }

    /// Returns a clone of the wrapped value as a `T`, if it is one.
    #[must_use]
    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// Applies `f` if the wrapped value is a `T`; otherwise returns `self`
    /// unchanged.
    ///
    /// This is the usual building block for binding transforms.
    #[must_use]
    pub fn map<T, U, F>(self, f: F) -> Self
    where
        T: 'static,
        U: Clone + 'static,
        F: FnOnce(&T) -> U,
    {
        match self.downcast_ref::<T>() {
            Some(v) => Self::new(f(v)),
            None => self,
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
            type_name: self.type_name,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

trait CloneAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn CloneAny>;
}

impl<T: Clone + 'static> CloneAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn CloneAny> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn value_downcasts_only_to_its_own_type() {
        let value = Value::new(7_u8);
        assert!(value.is::<u8>());
        assert!(!value.is::<u16>());
        assert_eq!(value.downcast_ref::<u16>(), None);
        assert_eq!(value.get::<u8>(), Some(7));
    }

    #[test]
    fn value_clone_is_deep() {
        let value = Value::new(String::from("tile"));
        let cloned = value.clone();
        drop(value);
        assert_eq!(cloned.downcast_ref::<String>().map(String::as_str), Some("tile"));
    }

    #[test]
    fn value_map_passes_through_other_types() {
        let text = Value::new(String::from("x"));
        let mapped = text.map(|n: &i32| n + 1);
        assert!(mapped.is::<String>());

        let number = Value::new(1_i32).map(|n: &i32| f64::from(*n) / 2.0);
        assert_eq!(number.get::<f64>(), Some(0.5));
    }

    #[test]
    fn value_debug_names_type() {
        let debug = format!("{:?}", Value::new(1.5_f64));
        assert!(debug.contains("Value"));
        assert!(debug.contains("f64"));
    }
}
