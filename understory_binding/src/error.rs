// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;
use core::fmt;

use crate::value::Value;

/// A typed setter received a value of the wrong type.
///
/// Returned by [`Setter`](crate::Setter) implementations, and propagated by
/// [`Object::set_values`](crate::Object::set_values) and
/// [`ObjectBuilder::build`](crate::ObjectBuilder::build).
#[derive(Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// The property key being written.
    pub key: String,
    /// The type the setter accepts.
    pub expected: &'static str,
    /// The type that was supplied.
    pub found: &'static str,
}

impl TypeMismatch {
    /// Builds the error for a setter of `key` expecting a `T` that was handed
    /// `value`.
    #[must_use]
    pub fn new<T: 'static>(key: &str, value: &Value) -> Self {
        Self {
            key: key.into(),
            expected: core::any::type_name::<T>(),
            found: value.type_name(),
        }
    }
}

impl fmt::Debug for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypeMismatch {{ key: {:?}, expected: {}, found: {} }}",
            self.key, self.expected, self.found
        )
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "property {:?} expects a value of type {}, got {}",
            self.key, self.expected, self.found
        )
    }
}

impl core::error::Error for TypeMismatch {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn mismatch_message_names_both_types() {
        let err = TypeMismatch::new::<f64>("resolution", &Value::new("fast"));
        let message = err.to_string();
        assert!(message.contains("resolution"));
        assert!(message.contains("f64"));
        assert!(message.contains("&str"));
    }
}
