// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for `understory_notify`.
//!
//! These focus on listener lifetime: what happens when handles, handlers and
//! targets are released in different orders.

use std::cell::RefCell;
use std::rc::Rc;

use understory_notify::{EventTarget, Listener};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Kind {
    Opened,
    Closed,
}

#[test]
fn listener_reports_event_type_and_activity() {
    let target = EventTarget::<Kind, ()>::new();
    let listener = target.subscribe(Kind::Opened, |_: &()| {});

    assert_eq!(listener.event_type(), &Kind::Opened);
    assert!(listener.is_active());
    assert!(target.has_listeners(&Kind::Opened));
    assert!(!target.has_listeners(&Kind::Closed));
}

#[test]
fn listener_outliving_target_is_inert() {
    let listener = {
        let target = EventTarget::<Kind, ()>::new();
        target.subscribe(Kind::Opened, |_: &()| {})
    };
    assert!(!listener.is_active());
    drop(listener);
}

#[test]
fn handler_holding_its_own_listener_can_drop_it() {
    let target = Rc::new(EventTarget::<Kind, u32>::new());
    let calls = Rc::new(RefCell::new(0));
    let slot: Rc<RefCell<Option<Listener<Kind, u32>>>> = Rc::default();

    let counter = calls.clone();
    let own = slot.clone();
    *slot.borrow_mut() = Some(target.subscribe(Kind::Closed, move |_: &u32| {
        *counter.borrow_mut() += 1;
        // One-shot: release ourselves on first delivery.
        own.borrow_mut().take();
    }));

    assert_eq!(target.dispatch(&Kind::Closed, &0), 1);
    assert_eq!(target.dispatch(&Kind::Closed, &0), 0);
    assert_eq!(*calls.borrow(), 1);
    assert!(target.is_empty());
}

#[test]
fn dropping_target_drops_handlers() {
    let witness = Rc::new(());
    let target = EventTarget::<Kind, ()>::new();
    let held = witness.clone();
    let listener = target.subscribe(Kind::Opened, move |_: &()| {
        let _ = &held;
    });
    assert_eq!(Rc::strong_count(&witness), 2);

    drop(target);
    assert_eq!(Rc::strong_count(&witness), 1);
    assert!(!listener.unsubscribe());
}

#[test]
fn dispatch_with_payload_reaches_every_listener_once() {
    let target = EventTarget::<Kind, String>::new();
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();

    let listeners: Vec<_> = (0..3)
        .map(|i| {
            let seen = seen.clone();
            target.subscribe(Kind::Opened, move |name: &String| {
                seen.borrow_mut().push(format!("{i}:{name}"));
            })
        })
        .collect();

    assert_eq!(target.dispatch(&Kind::Opened, &String::from("door")), 3);
    assert_eq!(*seen.borrow(), ["0:door", "1:door", "2:door"]);
    assert_eq!(target.len(), 3);

    drop(listeners);
    assert!(target.is_empty());
}
