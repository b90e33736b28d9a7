// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::fs;

use aloha_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use aloha_track::entity::{Entity, toplevel};
use aloha_track::{info, set_time, trace};

#[test]
fn file_tracker_filters_entities() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let path_str = path.to_str().unwrap();

    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: false,
            ..Default::default()
        },
        file: TrackerConfig {
            enable: true,
            level: log::Level::Info,
            filter_regex: ".*host1",
            file: Some(path_str),
        },
    };
    let tracker = setup_trackers(&config).unwrap();

    let top = toplevel(&tracker, "top");
    let host0 = Entity::new(&top, "host0");
    let host1 = Entity::new(&top, "host1");

    set_time!(top ; 2.5);
    info!(host0 ; "hidden");
    info!(host1 ; "shown {}", 1);
    trace!(host1 ; "too verbose");
    tracker.shutdown();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("2.500: "));
    assert!(lines[0].ends_with(":INFO: shown 1"));
}

#[test]
fn bad_filter_is_an_error() {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: true,
            level: log::Level::Info,
            filter_regex: "[",
            file: None,
        },
        ..Default::default()
    };
    assert!(setup_trackers(&config).is_err());
}

#[test]
fn file_without_name_is_an_error() {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: false,
            ..Default::default()
        },
        file: TrackerConfig {
            enable: true,
            file: None,
            ..Default::default()
        },
    };
    assert!(setup_trackers(&config).is_err());
}
