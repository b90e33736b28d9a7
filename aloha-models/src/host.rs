// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A contending station.
//!
//! Hosts are plain data kept in an arena inside the
//! [`SimulationState`](crate::state::SimulationState); processes refer to a
//! host by its index.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Host {
    /// Packets waiting to be transmitted.
    pub queue_length: u64,

    /// Consecutive failed attempts for the packet at the head of the queue.
    pub retry_count: u32,

    /// Slot in which the head-of-queue packet will next be transmitted.
    pub scheduled_slot: u64,
}

impl Host {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host transmits in `slot` if it has a packet scheduled for it.
    #[must_use]
    pub fn is_active(&self, slot: u64) -> bool {
        self.queue_length != 0 && self.scheduled_slot == slot
    }

    /// Add a packet to the queue. A packet arriving at an empty queue is
    /// scheduled for the slot after `current_slot`.
    ///
    /// Returns the new queue length.
    pub fn enqueue(&mut self, current_slot: u64) -> u64 {
        self.queue_length += 1;
        if self.queue_length == 1 {
            self.scheduled_slot = current_slot + 1;
        }
        self.queue_length
    }

    /// The head-of-queue packet got through. The next packet, if any, goes in
    /// the following slot.
    pub fn succeed(&mut self) {
        debug_assert!(self.queue_length > 0, "success from an empty queue");
        self.queue_length = self.queue_length.saturating_sub(1);
        self.retry_count = 0;
        self.scheduled_slot += 1;
    }

    /// The head-of-queue packet collided. Returns the new retry count.
    pub fn fail(&mut self) -> u32 {
        self.retry_count = self.retry_count.saturating_add(1);
        self.retry_count
    }

    /// Move the next attempt `delay` slots later.
    pub fn defer(&mut self, delay: u64) {
        self.scheduled_slot = self.scheduled_slot.saturating_add(delay);
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queue={} retries={} slot={}",
            self.queue_length, self.retry_count, self.scheduled_slot
        )
    }
}
