// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use aloha_track::entity::{Entity, toplevel};
use aloha_track::test_helpers::create_in_memory_tracker;
use aloha_track::{create, create_id, debug, set_time, value};

#[test]
fn records_logs_values_and_creates() {
    let (in_memory, tracker) = create_in_memory_tracker(log::Level::Trace);
    let top = toplevel(&tracker, "top");
    let channel = Entity::new(&top, "channel");

    set_time!(channel ; 3.0);
    debug!(channel ; "slot {} idle", 3);
    value!(channel ; 7u64);
    let packet_id = create_id!(channel);
    create!(channel ; packet_id, "packet");

    let id = in_memory.id_for("top::channel").unwrap();
    assert_eq!(id, channel.id);
    assert_eq!(in_memory.logs_for(id, log::Level::Debug), vec!["slot 3 idle"]);
    assert_eq!(in_memory.values_for(id), vec![7.0]);
    assert_eq!(in_memory.num_created_by(id), 1);
    assert_eq!(in_memory.time(), 3.0);
}

#[test]
fn level_limits_what_is_kept() {
    let (in_memory, tracker) = create_in_memory_tracker(log::Level::Info);
    let top = toplevel(&tracker, "top");

    debug!(top ; "not kept");
    value!(top ; 1.0);

    assert!(in_memory.events().is_empty());
}
