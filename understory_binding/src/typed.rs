// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed accessor capability.
//!
//! An object type may declare dedicated getter/setter functions for some of
//! its keys. Bindings reading or writing such a key on a target go through
//! the typed function instead of the generic [`Object::get`]/[`Object::set`],
//! and [`Object::set_values`] prefers the object's own typed setters.
//!
//! The table is attached when the object is built
//! ([`ObjectBuilder::accessors`](crate::ObjectBuilder::accessors)) and is
//! shared by every object of that type.

use crate::error::TypeMismatch;
use crate::object::Object;
use crate::value::Value;

/// A typed getter: reads one key of `object`.
pub type Getter = fn(&Object) -> Option<Value>;

/// A typed setter: validates and writes one key of `object`.
pub type Setter = fn(&Object, Value) -> Result<(), TypeMismatch>;

/// Per-type table of typed getters and setters.
///
/// Both methods default to "no typed accessor", which selects the generic path.
///
/// # Example
///
/// ```rust
/// use understory_binding::{Object, Setter, TypeMismatch, TypedAccessors, Value};
///
/// struct Zoom;
///
/// fn set_level(object: &Object, value: Value) -> Result<(), TypeMismatch> {
///     let level = value.get::<u8>().ok_or_else(|| TypeMismatch::new::<u8>("level", &value))?;
///     object.set("level", Value::new(level.min(20)));
///     Ok(())
/// }
///
/// impl TypedAccessors for Zoom {
///     fn setter(&self, key: &str) -> Option<Setter> {
///         (key == "level").then_some(set_level as Setter)
///     }
/// }
///
/// let zoom = Object::builder().accessors(&Zoom).build().unwrap();
/// zoom.set_values([("level", Value::new(99_u8))]).unwrap();
/// assert_eq!(zoom.get_as::<u8>("level"), Some(20));
///
/// assert!(zoom.set_values([("level", Value::new("max"))]).is_err());
/// ```
pub trait TypedAccessors {
    /// Returns the typed getter for `key`, if this type declares one.
    fn getter(&self, _key: &str) -> Option<Getter> {
        None
    }

    /// Returns the typed setter for `key`, if this type declares one.
    fn setter(&self, _key: &str) -> Option<Setter> {
        None
    }
}

/// The accessor table with no typed accessors.
#[derive(Copy, Clone, Debug, Default)]
pub struct Untyped;

impl TypedAccessors for Untyped {}
