// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change-event naming and publication.
//!
//! Every object publishes three families of events on its
//! [`EventTarget`](understory_notify::EventTarget):
//!
//! | Event type | Payload key | Fired |
//! |------------|-------------|-------|
//! | [`EventType::Change`] (`change:<key>`) | none | after `key` changed |
//! | [`EventType::PropertyChange`] (`propertychange`) | the key | after any key changed |
//! | [`EventType::BeforePropertyChange`] (`beforepropertychange`) | the key | before any key changes |

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use understory_notify::{EventTarget, Listener};

use crate::Key;

/// Identifies a family of property events.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// The canonical change event of one key.
    ///
    /// Holds the lowercased key; build it with [`change_event_type`].
    Change(Key),
    /// Fired after any property changed; the payload carries the key.
    PropertyChange,
    /// Fired before any property changes; the payload carries the key.
    BeforePropertyChange,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Change(name) => write!(f, "change:{name}"),
            Self::PropertyChange => f.write_str("propertychange"),
            Self::BeforePropertyChange => f.write_str("beforepropertychange"),
        }
    }
}

/// Returns the canonical change event for `key`.
///
/// Keys are matched case-insensitively:
///
/// ```rust
/// use understory_binding::change_event_type;
///
/// assert_eq!(change_event_type("Resolution"), change_event_type("resolution"));
/// assert_eq!(change_event_type("Resolution").to_string(), "change:resolution");
/// ```
#[must_use]
pub fn change_event_type(key: &str) -> EventType {
    EventType::Change(Rc::from(key.to_lowercase()))
}

/// Payload delivered to property event handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyEvent {
    event_type: EventType,
    key: Option<Key>,
}

impl PropertyEvent {
    /// The event type this payload was dispatched as.
    #[must_use]
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// The property key, for [`EventType::PropertyChange`] and
    /// [`EventType::BeforePropertyChange`].
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

/// The event target type carried by every object.
pub type PropertyEventTarget = EventTarget<EventType, PropertyEvent>;

/// Handle for a handler registered on a [`PropertyEventTarget`].
pub type PropertyListener = Listener<EventType, PropertyEvent>;

/// Publishes property events and memoizes change-event names.
#[derive(Debug, Default)]
pub(crate) struct ChangeNotifier {
    names: RefCell<HashMap<Key, EventType>>,
}

impl ChangeNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn change_event_type(&self, key: &str) -> EventType {
        if let Some(event_type) = self.names.borrow().get(key) {
            return event_type.clone();
        }
        let event_type = change_event_type(key);
        self.names
            .borrow_mut()
            .insert(Rc::from(key), event_type.clone());
        event_type
    }

    /// Publishes the canonical change event for `key`, then the generic
    /// property change event.
    pub(crate) fn notify_change(&self, events: &PropertyEventTarget, key: &str) {
        let event_type = self.change_event_type(key);
        let specific = PropertyEvent {
            event_type: event_type.clone(),
            key: None,
        };
        events.dispatch(&event_type, &specific);

        let generic = PropertyEvent {
            event_type: EventType::PropertyChange,
            key: Some(Rc::from(key)),
        };
        events.dispatch(&EventType::PropertyChange, &generic);
    }

    pub(crate) fn before_change(&self, events: &PropertyEventTarget, key: &str) {
        let event = PropertyEvent {
            event_type: EventType::BeforePropertyChange,
            key: Some(Rc::from(key)),
        };
        events.dispatch(&EventType::BeforePropertyChange, &event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    #[test]
    fn event_type_names() {
        assert_eq!(change_event_type("Center").to_string(), "change:center");
        assert_eq!(EventType::PropertyChange.to_string(), "propertychange");
        assert_eq!(
            EventType::BeforePropertyChange.to_string(),
            "beforepropertychange"
        );
    }

    #[test]
    fn notifier_memoizes_per_key() {
        let notifier = ChangeNotifier::new();
        let first = notifier.change_event_type("Zoom");
        let second = notifier.change_event_type("Zoom");
        assert_eq!(first, second);
        assert_eq!(first, notifier.change_event_type("zoom"));
        assert_eq!(notifier.names.borrow().len(), 2);
    }

    #[test]
    fn notify_change_publishes_specific_then_generic() {
        let notifier = ChangeNotifier::new();
        let events = PropertyEventTarget::new();
        let log: Rc<RefCell<Vec<String>>> = Rc::default();

        let sink = log.clone();
        let _specific = events.subscribe(change_event_type("zoom"), move |e: &PropertyEvent| {
            assert!(e.key().is_none());
            sink.borrow_mut().push(e.event_type().to_string());
        });
        let sink = log.clone();
        let _generic = events.subscribe(EventType::PropertyChange, move |e: &PropertyEvent| {
            sink.borrow_mut().push(alloc::format!("{}:{}", e.event_type(), e.key().unwrap()));
        });

        notifier.notify_change(&events, "Zoom");
        notifier.notify_change(&events, "center");
        assert_eq!(
            *log.borrow(),
            ["change:zoom", "propertychange:Zoom", "propertychange:center"]
        );
    }
}
