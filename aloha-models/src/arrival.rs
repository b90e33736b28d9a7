// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Packet arrivals for one host.
//!
//! Packets arrive as a Poisson process: the gap between arrivals is drawn from
//! an exponential distribution with the configured arrival rate (mean
//! `1 / rate`). The process only ever touches its own host.

use std::cell::RefCell;
use std::rc::Rc;

use aloha_engine::engine::Engine;
use aloha_engine::time::clock::Clock;
use aloha_engine::traits::Runnable;
use aloha_engine::types::{SimError, SimResult};
use aloha_model_builder::{EntityDisplay, EntityGet};
use aloha_track::entity::Entity;
use aloha_track::{trace, value};
use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};

use crate::state::SharedState;

#[derive(EntityGet, EntityDisplay)]
pub struct PacketArrival {
    entity: Rc<Entity>,
    clock: Clock,
    host: usize,
    state: SharedState,
    inter_arrival: Exp<f64>,
    rng: RefCell<ChaCha8Rng>,
}

impl PacketArrival {
    pub fn new_and_register(
        engine: &Engine,
        clock: &Clock,
        parent: &Rc<Entity>,
        host: usize,
        state: &SharedState,
        rng: ChaCha8Rng,
    ) -> Result<Rc<Self>, SimError> {
        let rate = state.borrow().arrival_rate();
        let inter_arrival = Exp::new(rate)
            .map_err(|e| SimError(format!("invalid arrival rate {rate}: {e}")))?;

        let entity = Rc::new(Entity::new(parent, &format!("host{host}")));
        let rc_self = Rc::new(Self {
            entity,
            clock: clock.clone(),
            host,
            state: state.clone(),
            inter_arrival,
            rng: RefCell::new(rng),
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    #[must_use]
    pub fn host(&self) -> usize {
        self.host
    }
}

#[async_trait(?Send)]
impl Runnable for PacketArrival {
    async fn run(&self) -> SimResult {
        loop {
            let gap = self.inter_arrival.sample(&mut *self.rng.borrow_mut());
            self.clock.wait(gap).await;

            let queue_length = self.state.borrow_mut().packet_arrived(self.host);
            trace!(self.entity ; "arrival, queue length {queue_length}");
            value!(self.entity ; queue_length);
        }
    }
}
