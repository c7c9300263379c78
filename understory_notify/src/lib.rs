// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Notify: synchronous event targets with RAII listener handles.
//!
//! An [`EventTarget`] is a per-object listener registry. Handlers are keyed by
//! an event type `T` and receive a borrowed payload `P` when the target
//! dispatches that type.
//!
//! ## Dispatch model
//!
//! - Dispatch is synchronous and depth-first: [`EventTarget::dispatch`] runs
//!   every matching handler before it returns, and a handler may dispatch
//!   further events (on this or any other target) recursively.
//! - Handlers run in subscription order.
//! - No borrow of the registry is held while a handler runs, so handlers may
//!   subscribe, unsubscribe or dispatch freely.
//! - A listener removed during a dispatch is not invoked for the remainder of
//!   that dispatch. A listener added during a dispatch is first invoked by the
//!   next dispatch.
//!
//! ## Listener lifetime
//!
//! [`EventTarget::subscribe`] returns a [`Listener`]. Dropping the listener (or
//! calling [`Listener::unsubscribe`]) removes the handler. Listeners only hold
//! a weak reference to their target, so a listener may outlive the target; it
//! simply becomes inactive.
//!
//! ## Example
//!
//! ```rust
//! use core::cell::Cell;
//! use std::rc::Rc;
//! use understory_notify::EventTarget;
//!
//! let target = EventTarget::<&'static str, u32>::new();
//! let total = Rc::new(Cell::new(0));
//!
//! let sum = total.clone();
//! let listener = target.subscribe("add", move |n: &u32| sum.set(sum.get() + n));
//!
//! assert_eq!(target.dispatch(&"add", &2), 1);
//! assert_eq!(target.dispatch(&"other", &5), 0);
//! assert_eq!(total.get(), 2);
//!
//! assert!(listener.unsubscribe());
//! target.dispatch(&"add", &2);
//! assert_eq!(total.get(), 2);
//! ```
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); neither type is `Send`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature only forwards to
//! `tracing/std`.

#![no_std]

extern crate alloc;

mod target;

pub use target::{EventTarget, Listener};
