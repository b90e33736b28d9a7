// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;

use crate::Id;
use crate::tracker::{EntityManager, Track};

/// A [`Track`] event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCommon {
    /// The [`Id`] of the event originator.
    pub id: Id,

    /// The virtual time at which the event occurred.
    pub time: f64,

    /// Any event-specific state.
    pub event: Event,
}

/// The event-specific state kept by the [`InMemoryTracker`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An object was created by the originator.
    Create {
        /// The ID of the new object.
        created: Id,
        /// The display name of the new object.
        name: String,
    },
    /// An object was destroyed.
    Destroy {
        /// The ID of the destroyed object.
        destroyed: Id,
    },
    /// A counter was updated.
    Value {
        /// The new value.
        value: f64,
    },
    /// A log message.
    Log {
        /// The level it was logged at.
        level: log::Level,
        /// The formatted message.
        text: String,
    },
}

/// A tracker that keeps all events in memory so that they can be inspected.
///
/// Mainly used by tests which want to check what a model reported.
pub struct InMemoryTracker {
    entity_manager: EntityManager,
    names: RefCell<Vec<(Id, String)>>,
    events: RefCell<Vec<EventCommon>>,
}

impl InMemoryTracker {
    /// Create a new [`InMemoryTracker`] with an [`EntityManager`].
    #[must_use]
    pub fn new(entity_manager: EntityManager) -> Self {
        Self {
            entity_manager,
            names: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
        }
    }

    fn add_event(&self, id: Id, event: Event) {
        let time = self.entity_manager.time();
        self.events
            .borrow_mut()
            .push(EventCommon { id, time, event });
    }

    /// Return a copy of all events seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<EventCommon> {
        self.events.borrow().clone()
    }

    /// Look up the [`Id`] of an entity by its full name.
    #[must_use]
    pub fn id_for(&self, full_name: &str) -> Option<Id> {
        self.names
            .borrow()
            .iter()
            .find(|(_, name)| name == full_name)
            .map(|(id, _)| *id)
    }

    /// All log messages emitted by `id` at exactly `level`.
    #[must_use]
    pub fn logs_for(&self, id: Id, level: log::Level) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.id == id)
            .filter_map(|e| match &e.event {
                Event::Log { level: l, text } if *l == level => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// All values recorded by `id`, in order.
    #[must_use]
    pub fn values_for(&self, id: Id) -> Vec<f64> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.id == id)
            .filter_map(|e| match e.event {
                Event::Value { value } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Number of objects created by `id`.
    #[must_use]
    pub fn num_created_by(&self, id: Id) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.id == id)
            .filter(|e| matches!(e.event, Event::Create { .. }))
            .count()
    }

    /// The latest time seen.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.entity_manager.time()
    }
}

impl Track for InMemoryTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_log_enabled_at_level(id, level)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
        self.names.borrow_mut().push((id, entity_name.to_owned()));
    }

    fn create(&self, created_by: Id, created: Id, name: &str) {
        self.add_event(
            created_by,
            Event::Create {
                created,
                name: name.to_owned(),
            },
        );
    }

    fn destroy(&self, destroyed_by: Id, destroyed: Id) {
        self.add_event(destroyed_by, Event::Destroy { destroyed });
    }

    fn value(&self, id: Id, value: f64) {
        self.add_event(id, Event::Value { value });
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(
            id,
            Event::Log {
                level,
                text: msg.to_string(),
            },
        );
    }

    fn time(&self, _set_by: Id, time: f64) {
        self.entity_manager.set_time(time);
    }

    fn shutdown(&self) {}
}
