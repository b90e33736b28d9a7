// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! State shared by every process of one run.
//!
//! The arrival processes and the collision resolver all hold a
//! [`SharedState`]. Each process only borrows it between suspension points,
//! so the host invariants hold whenever a process is waiting on the clock.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;

use crate::backoff::Backoff;
use crate::host::Host;
use crate::packet::Packet;

pub type SharedState = Rc<RefCell<SimulationState>>;

/// What happened in one slot.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotOutcome {
    /// No host transmitted.
    Idle,

    /// Exactly one host transmitted.
    Success(Packet),

    /// Two or more hosts transmitted. Holds the indices of the hosts involved.
    Collision(Vec<usize>),
}

/// Counters describing a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Slots resolved so far.
    pub slots: u64,
    pub successes: u64,

    /// One per host involved in each collision.
    pub failures: u64,
    pub idle_slots: u64,
    pub collision_slots: u64,

    /// Packets still waiting in host queues.
    pub queued: u64,
}

impl RunStats {
    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.successes + self.failures
    }
}

pub struct SimulationState {
    arrival_rate: f64,
    slot: u64,
    successes: u64,
    failures: u64,
    idle_slots: u64,
    collision_slots: u64,
    next_packet_id: u64,
    hosts: Vec<Host>,
}

impl SimulationState {
    #[must_use]
    pub fn new(num_hosts: usize, arrival_rate: f64) -> Self {
        Self {
            arrival_rate,
            slot: 0,
            successes: 0,
            failures: 0,
            idle_slots: 0,
            collision_slots: 0,
            next_packet_id: 1,
            hosts: vec![Host::new(); num_hosts],
        }
    }

    #[must_use]
    pub fn new_shared(num_hosts: usize, arrival_rate: f64) -> SharedState {
        Rc::new(RefCell::new(Self::new(num_hosts, arrival_rate)))
    }

    #[must_use]
    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    /// The slot that will be resolved next.
    #[must_use]
    pub fn slot(&self) -> u64 {
        self.slot
    }

    #[must_use]
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Direct access to one host.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid host index.
    pub fn host_mut(&mut self, index: usize) -> &mut Host {
        &mut self.hosts[index]
    }

    #[must_use]
    pub fn successes(&self) -> u64 {
        self.successes
    }

    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// A packet arrived at host `index`. Returns its new queue length.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid host index.
    pub fn packet_arrived(&mut self, index: usize) -> u64 {
        let slot = self.slot;
        self.hosts[index].enqueue(slot)
    }

    /// Resolve the current slot and move on to the next one.
    ///
    /// A single active host delivers its head-of-queue packet. When two or
    /// more hosts are active they all fail and are deferred according to
    /// `backoff`, in host index order.
    pub fn resolve_slot<R: Rng + ?Sized>(
        &mut self,
        backoff: Backoff,
        rng: &mut R,
        now: f64,
    ) -> SlotOutcome {
        let slot = self.slot;
        let active: Vec<usize> = self
            .hosts
            .iter()
            .enumerate()
            .filter(|(_, host)| host.is_active(slot))
            .map(|(index, _)| index)
            .collect();

        let outcome = match active.len() {
            0 => {
                self.idle_slots += 1;
                SlotOutcome::Idle
            }
            1 => {
                let index = active[0];
                self.successes += 1;
                self.hosts[index].succeed();
                let packet = Packet::new(self.next_packet_id, index, now);
                self.next_packet_id += 1;
                SlotOutcome::Success(packet)
            }
            _ => {
                self.collision_slots += 1;
                for index in &active {
                    let host = &mut self.hosts[*index];
                    let retry_count = host.fail();
                    host.defer(backoff.delay(retry_count, rng));
                    self.failures += 1;
                }
                SlotOutcome::Collision(active)
            }
        };

        self.slot += 1;
        outcome
    }

    #[must_use]
    pub fn stats(&self) -> RunStats {
        RunStats {
            slots: self.slot,
            successes: self.successes,
            failures: self.failures,
            idle_slots: self.idle_slots,
            collision_slots: self.collision_slots,
            queued: self.hosts.iter().map(|h| h.queue_length).sum(),
        }
    }
}
