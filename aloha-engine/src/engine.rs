// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The simulation engine.
//!
//! The engine owns the executor, the virtual timeline and the top-level
//! [`Entity`] of the simulation. Components are registered with the engine
//! and their `run()` functions are spawned, in registration order, when the
//! simulation starts.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use aloha_track::{Tracker, set_time};
use aloha_track::entity::{Entity, toplevel};
use aloha_track::tracker::stdout_tracker;

use crate::executor::{self, Executor, Spawner};
use crate::time::clock::Clock;
use crate::types::{Component, SimResult};

/// Ticks of the default clock are one time unit long.
const DEFAULT_TICK_DURATION: f64 = 1.0;

pub struct Engine {
    pub executor: Executor,
    pub spawner: Spawner,
    toplevel: Rc<Entity>,
    tracker: Tracker,
    components: RefCell<Vec<Component>>,
}

impl Engine {
    /// Create a standalone engine.
    #[must_use]
    pub fn new(tracker: &Tracker) -> Self {
        let toplevel = toplevel(tracker, "top");
        set_time!(toplevel ; 0.0);
        let (executor, spawner) = executor::new_executor_and_spawner(&toplevel);
        Self {
            executor,
            spawner,
            toplevel,
            tracker: tracker.clone(),
            components: RefCell::new(Vec::new()),
        }
    }

    /// Register a component whose `run()` will be spawned when the
    /// simulation starts.
    pub fn register(&self, component: Component) {
        self.components.borrow_mut().push(component);
    }

    fn spawn_components(&self) {
        for component in self.components.borrow_mut().drain(..) {
            self.spawner.spawn(async move { component.run().await });
        }
    }

    /// Run until there are no more events.
    pub fn run(&mut self) -> SimResult {
        self.spawn_components();
        self.executor.run(None)
    }

    /// Run every event strictly before `horizon`. The clock is left at
    /// `horizon` and events still pending at that point are discarded.
    pub fn run_until(&mut self, horizon: f64) -> SimResult {
        self.spawn_components();
        self.executor.run(Some(horizon))
    }

    pub fn spawn(&self, future: impl Future<Output = SimResult> + 'static) {
        self.executor.spawn(future);
    }

    #[must_use]
    pub fn default_clock(&self) -> Clock {
        self.executor.clock(DEFAULT_TICK_DURATION)
    }

    /// Returns a clock whose ticks last `tick_duration` time units.
    #[must_use]
    pub fn clock(&self, tick_duration: f64) -> Clock {
        self.executor.clock(tick_duration)
    }

    #[must_use]
    pub fn time_now(&self) -> f64 {
        self.executor.time_now()
    }

    #[must_use]
    pub fn top(&self) -> &Rc<Entity> {
        &self.toplevel
    }

    #[must_use]
    pub fn tracker(&self) -> Tracker {
        self.tracker.clone()
    }
}

/// Create a default engine that sends [`Track`](aloha_track::Track) events to
/// stdout.
///
/// This is provided to keep documentation examples simple with fewer
/// concepts to have to consider at once.
impl Default for Engine {
    fn default() -> Self {
        let tracker = stdout_tracker(log::Level::Warn);
        Self::new(&tracker)
    }
}
