// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use aloha_models::backoff::Backoff;
use aloha_models::simulation::{SimulationConfig, simulate};
use aloha_track::test_helpers::create_in_memory_tracker;
use log::Level;

#[test]
fn channel_logs_every_busy_slot() {
    let (in_memory, tracker) = create_in_memory_tracker(Level::Debug);
    let config = SimulationConfig {
        horizon: 3000.0,
        arrival_rate: 0.09,
        ..SimulationConfig::default()
    };
    let result = simulate(&tracker, &config).unwrap();

    let channel = in_memory
        .id_for("top::exponential_0.09::channel")
        .unwrap();
    let logs = in_memory.logs_for(channel, Level::Debug);
    let delivered: Vec<&String> = logs.iter().filter(|l| l.contains("delivered")).collect();
    let collisions = logs.iter().filter(|l| l.contains("collision")).count() as u64;

    assert_eq!(delivered.len() as u64, result.stats.successes);
    assert_eq!(collisions, result.stats.collision_slots);
    for (i, line) in delivered.iter().enumerate() {
        assert!(
            line.contains(&format!("delivered packet {} from", i + 1)),
            "{line}"
        );
    }

    let run = in_memory.id_for("top::exponential_0.09").unwrap();
    assert_eq!(in_memory.logs_for(run, Level::Info).len(), 1);
}

#[test]
fn every_arrival_is_delivered_or_queued() {
    let (in_memory, tracker) = create_in_memory_tracker(Level::Trace);
    let config = SimulationConfig {
        horizon: 2000.0,
        arrival_rate: 0.05,
        backoff: Backoff::Linear,
        ..SimulationConfig::default()
    };
    let result = simulate(&tracker, &config).unwrap();

    let mut arrivals = 0;
    for host in 0..config.num_hosts {
        let id = in_memory
            .id_for(&format!("top::linear_0.05::host{host}"))
            .unwrap();
        let queue_lengths = in_memory.values_for(id);
        assert_eq!(
            in_memory.logs_for(id, Level::Trace).len(),
            queue_lengths.len()
        );
        assert!(queue_lengths.iter().all(|q| *q >= 1.0));
        arrivals += queue_lengths.len() as u64;
    }
    assert_eq!(arrivals, result.stats.successes + result.stats.queued);

    let channel = in_memory.id_for("top::linear_0.05::channel").unwrap();
    assert_eq!(
        in_memory.num_created_by(channel) as u64,
        result.stats.successes
    );
}

#[test]
fn quiet_tracker_records_nothing() {
    let (in_memory, tracker) = create_in_memory_tracker(Level::Warn);
    let config = SimulationConfig {
        horizon: 1000.0,
        ..SimulationConfig::default()
    };
    simulate(&tracker, &config).unwrap();
    assert!(in_memory.events().is_empty());
    assert_eq!(in_memory.time(), 1000.0);
}
