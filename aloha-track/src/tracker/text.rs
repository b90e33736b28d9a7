// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use log;

use crate::tracker::{EntityManager, Track};
use crate::{Id, SharedWriter, Writer};

/// A simple text logger to output messages to a Writer.
///
/// Every line is prefixed with the virtual time of the last `time` event.
pub struct TextTracker {
    entity_manager: EntityManager,

    /// Writer to which all _log_ events will be written.
    writer: SharedWriter,
}

impl TextTracker {
    /// Create a new [`TextTracker`] with an [`EntityManager`].
    pub fn new(entity_manager: EntityManager, writer: Writer) -> Self {
        Self {
            entity_manager,
            writer: Rc::new(RefCell::new(writer)),
        }
    }

    fn write_line(&self, line: fmt::Arguments) {
        let time = self.entity_manager.time();
        writeln!(self.writer.borrow_mut(), "{time:.3}: {line}")
            .expect("failed to write track event");
    }
}

/// Implementation for each [`Track`] event
impl Track for TextTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_log_enabled_at_level(id, level)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
    }

    fn create(&self, created_by: Id, id: Id, name: &str) {
        self.write_line(format_args!("{created_by}: created {id}, {name}"));
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.write_line(format_args!("{destroyed_by}: destroyed {id}"));
    }

    fn value(&self, id: Id, value: f64) {
        self.write_line(format_args!("{id}: value {value}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.write_line(format_args!("{id}:{level}: {msg}"));
    }

    fn time(&self, set_by: Id, time: f64) {
        self.entity_manager.set_time(time);
        if self.is_entity_enabled(set_by, log::Level::Trace) {
            self.write_line(format_args!("{set_by}: set time to {time:.3}"));
        }
    }

    fn shutdown(&self) {
        self.writer
            .borrow_mut()
            .flush()
            .expect("failed to flush track output");
    }
}
