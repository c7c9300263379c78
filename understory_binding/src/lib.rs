// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Binding: key-value observing and property binding.
//!
//! An [`Object`] maps string keys to opaque [`Value`]s, publishes events when
//! they change, and can bind any of its keys to a key on another object.
//!
//! ## Core Concepts
//!
//! ### Properties and events
//!
//! [`Object::set`] publishes a before-change event, stores the value, then
//! publishes the key's change event followed by the generic property change
//! event. [`Object::get`] returns the stored value, or `None`. See
//! [`EventType`] for the event families and their payloads.
//!
//! ### Bindings
//!
//! [`Object::bind_to_key`] redirects a key to a key on a target object:
//!
//! - reads come from the target, through an optional reverse transform;
//! - writes go to the target, through an optional forward transform;
//! - the target's change and before-change events for that key are relayed
//!   as events of the bound key.
//!
//! Bindings chain: a key may be bound to a key that is itself bound. A write
//! anywhere along the chain lands on the object at the end of it, and change
//! events travel back along every hop, synchronously and in order.
//!
//! [`Object::unbind`] detaches a key and keeps its last observed value
//! locally, without firing change events.
//!
//! ### Typed accessors
//!
//! An object type can route particular keys through dedicated functions by
//! implementing [`TypedAccessors`]. Bindings and [`Object::set_values`] use
//! them in preference to the generic path.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_binding::Object;
//!
//! let map_view = Object::new();
//! map_view.set_as("rotation", 0.0_f64);
//!
//! // A control that mirrors the view's rotation.
//! let control = Object::new();
//! control.bind_to("rotation", &map_view);
//! assert_eq!(control.get_as::<f64>("rotation"), Some(0.0));
//!
//! // Writing on either side updates both.
//! control.set_as("rotation", 1.5_f64);
//! assert_eq!(map_view.get_as::<f64>("rotation"), Some(1.5));
//!
//! // Detaching keeps the last value.
//! control.unbind("rotation");
//! map_view.set_as("rotation", 3.0_f64);
//! assert_eq!(control.get_as::<f64>("rotation"), Some(1.5));
//! ```
//!
//! ## Threading and cycles
//!
//! Objects are single-threaded (`Rc`/`RefCell`) and all notification is
//! synchronous and depth-first. Binding cycles are not detected; use
//! [`ObjectBuilder::max_depth`] to bound re-entrancy when cycles are possible.
//!
//! ## Logging
//!
//! Bind/unbind are logged at `debug` level through `tracing`; dropped writes,
//! dangling targets and depth-limit trips are logged at `warn`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod accessor;
mod binding;
mod error;
mod notify;
mod object;
mod store;
mod typed;
mod value;

/// A property key.
///
/// Keys are reference-counted so that tables, relays and event payloads can
/// share one allocation.
pub type Key = alloc::rc::Rc<str>;

pub use accessor::Transform;
pub use binding::Binding;
pub use error::TypeMismatch;
pub use notify::{
    EventType, PropertyEvent, PropertyEventTarget, PropertyListener, change_event_type,
};
pub use object::{Object, ObjectBuilder, Properties, WeakObject};
pub use typed::{Getter, Setter, TypedAccessors, Untyped};
pub use value::Value;
