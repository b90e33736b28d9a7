// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! One slotted-ALOHA run.
//!
//! A [`Simulation`] owns a fresh [`Engine`] and [`SimulationState`]. It
//! registers one [`PacketArrival`] per host, in host index order, followed by
//! the [`CollisionResolver`]. That registration order is also the order in
//! which processes due at the same instant resume.
//!
//! # Random streams
//!
//! Every process draws from its own ChaCha8 stream derived from the run seed:
//! stream `i` for host `i` and stream `num_hosts` for the resolver. The
//! arrival pattern of a seed is therefore the same whichever backoff is used.

use std::rc::Rc;

use aloha_engine::engine::Engine;
use aloha_engine::sim_error;
use aloha_engine::types::{SimError, SimResult};
use aloha_track::entity::Entity;
use aloha_track::{Tracker, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arrival::PacketArrival;
use crate::backoff::Backoff;
use crate::collision::CollisionResolver;
use crate::host::Host;
use crate::state::{RunStats, SharedState, SimulationState};
use crate::throughput::throughput;

/// Parameters of a single run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub num_hosts: usize,
    pub arrival_rate: f64,

    /// Duration of a slot in virtual time units.
    pub slot_duration: f64,

    /// Virtual time at which the run stops.
    pub horizon: f64,
    pub backoff: Backoff,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_hosts: 10,
            arrival_rate: 0.01,
            slot_duration: 1.0,
            horizon: 100_000.0,
            backoff: Backoff::Exponential,
            seed: 1,
        }
    }
}

impl SimulationConfig {
    /// Reject configurations that would divide by zero or never advance time.
    pub fn validate(&self) -> SimResult {
        if self.num_hosts == 0 {
            return sim_error!("number of hosts must be at least 1");
        }
        if !(self.arrival_rate.is_finite() && self.arrival_rate > 0.0) {
            return sim_error!(format!(
                "arrival rate must be positive and finite, got {}",
                self.arrival_rate
            ));
        }
        if !(self.slot_duration.is_finite() && self.slot_duration > 0.0) {
            return sim_error!(format!(
                "slot duration must be positive and finite, got {}",
                self.slot_duration
            ));
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return sim_error!(format!(
                "horizon must be positive and finite, got {}",
                self.horizon
            ));
        }
        Ok(())
    }
}

/// Random stream for one process of a run.
#[must_use]
pub fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// The outcome of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub backoff: Backoff,
    pub arrival_rate: f64,
    pub stats: RunStats,

    /// Host state at the horizon.
    pub hosts: Vec<Host>,
}

impl RunResult {
    #[must_use]
    pub fn successes(&self) -> u64 {
        self.stats.successes
    }

    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.stats.total_attempts()
    }

    #[must_use]
    pub fn throughput(&self) -> f64 {
        throughput(self.stats.successes, self.stats.total_attempts())
    }
}

pub struct Simulation {
    engine: Engine,
    entity: Rc<Entity>,
    state: SharedState,
    config: SimulationConfig,
}

impl Simulation {
    /// Build the engine and every process of a run.
    pub fn new(tracker: &Tracker, config: &SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;

        let engine = Engine::new(tracker);
        let entity = Rc::new(Entity::new(
            engine.top(),
            &format!("{}_{}", config.backoff, config.arrival_rate),
        ));
        let state = SimulationState::new_shared(config.num_hosts, config.arrival_rate);
        let clock = engine.clock(config.slot_duration);

        for host in 0..config.num_hosts {
            PacketArrival::new_and_register(
                &engine,
                &clock,
                &entity,
                host,
                &state,
                stream_rng(config.seed, host as u64),
            )?;
        }
        CollisionResolver::new_and_register(
            &engine,
            &clock,
            &entity,
            "channel",
            &state,
            config.backoff,
            stream_rng(config.seed, config.num_hosts as u64),
        )?;

        Ok(Self {
            engine,
            entity,
            state,
            config: config.clone(),
        })
    }

    #[must_use]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run to the horizon and collect the results.
    pub fn run(mut self) -> Result<RunResult, SimError> {
        self.engine.run_until(self.config.horizon)?;

        let state = self.state.borrow();
        let stats = state.stats();
        info!(self.entity ; "{} successes out of {} attempts in {} slots ({} idle, {} collisions, {} still queued)",
            stats.successes,
            stats.total_attempts(),
            stats.slots,
            stats.idle_slots,
            stats.collision_slots,
            stats.queued);

        Ok(RunResult {
            backoff: self.config.backoff,
            arrival_rate: self.config.arrival_rate,
            stats,
            hosts: state.hosts().to_vec(),
        })
    }
}

/// Build and run a single simulation.
pub fn simulate(tracker: &Tracker, config: &SimulationConfig) -> Result<RunResult, SimError> {
    Simulation::new(tracker, config)?.run()
}
