// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The shared channel.
//!
//! Once per slot the resolver looks at every host, decides whether the slot
//! was idle, a success or a collision, and applies the result through
//! [`SimulationState::resolve_slot`](crate::state::SimulationState::resolve_slot).

use std::cell::RefCell;
use std::rc::Rc;

use aloha_engine::engine::Engine;
use aloha_engine::time::clock::Clock;
use aloha_engine::traits::Runnable;
use aloha_engine::types::{SimError, SimResult};
use aloha_model_builder::{EntityDisplay, EntityGet};
use aloha_track::entity::Entity;
use aloha_track::{create, create_id, debug, value};
use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;

use crate::backoff::Backoff;
use crate::state::{SharedState, SlotOutcome};

#[derive(EntityGet, EntityDisplay)]
pub struct CollisionResolver {
    entity: Rc<Entity>,

    /// Ticks of this clock are slots.
    clock: Clock,
    state: SharedState,
    backoff: Backoff,
    rng: RefCell<ChaCha8Rng>,
}

impl CollisionResolver {
    pub fn new_and_register(
        engine: &Engine,
        clock: &Clock,
        parent: &Rc<Entity>,
        name: &str,
        state: &SharedState,
        backoff: Backoff,
        rng: ChaCha8Rng,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(Self {
            entity,
            clock: clock.clone(),
            state: state.clone(),
            backoff,
            rng: RefCell::new(rng),
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }
}

#[async_trait(?Send)]
impl Runnable for CollisionResolver {
    async fn run(&self) -> SimResult {
        loop {
            let slot = self.state.borrow().slot();
            let outcome = self.state.borrow_mut().resolve_slot(
                self.backoff,
                &mut *self.rng.borrow_mut(),
                self.clock.time_now(),
            );

            match &outcome {
                SlotOutcome::Idle => {}
                SlotOutcome::Success(packet) => {
                    debug!(self.entity ; "slot {slot}: delivered {packet}");
                    create!(self.entity ; create_id!(self.entity), packet);
                    value!(self.entity ; self.state.borrow().successes());
                }
                SlotOutcome::Collision(hosts) => {
                    debug!(self.entity ; "slot {slot}: collision between hosts {hosts:?}");
                }
            }

            self.clock.wait_ticks(1).await;
        }
    }
}
