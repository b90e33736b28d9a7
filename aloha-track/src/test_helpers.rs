// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

//! Helper functions for tests that need a [`Tracker`].

use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;

use crate::tracker::{EntityManager, InMemoryTracker, TextTracker};
use crate::{Tracker, Writer};

/// Place all trace files in one folder
const FOLDER: &str = "traces";

/// Create a [`Tracker`] for a test that writes to `traces/<test>.log`.
///
/// The test name is taken from the stem of `full_filepath`, normally the
/// caller's `file!()`.
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    fs::create_dir_all(FOLDER).unwrap();

    let filename_only = Path::new(full_filepath)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap();

    let log_writer: Writer = Box::new(BufWriter::new(
        fs::File::create(format!("{FOLDER}/{filename_only}.log")).unwrap(),
    ));

    let entity_manger = EntityManager::new(log::Level::Info);
    let tracker: Tracker = Rc::new(TextTracker::new(entity_manger, log_writer));
    tracker
}

/// Create an [`InMemoryTracker`] that keeps every event up to `level`.
///
/// Returns both the concrete tracker for inspection and the shared
/// [`Tracker`] to hand to the simulation.
#[must_use]
pub fn create_in_memory_tracker(level: log::Level) -> (Rc<InMemoryTracker>, Tracker) {
    let in_memory = Rc::new(InMemoryTracker::new(EntityManager::new(level)));
    let tracker: Tracker = in_memory.clone();
    (in_memory, tracker)
}
