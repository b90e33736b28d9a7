// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Clocks and delays.
//!
//! The [`ClockState`] owns the current virtual time and the queue of tasks
//! waiting for a later time. A [`Clock`] is a cheap handle onto that state
//! with a tick duration, which lets models count time in whole ticks.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use aloha_track::entity::Entity;
use aloha_track::set_time;

use crate::time::queue::{EventQueue, TaskId};

/// Shared state between futures using a Clock and the executor.
pub struct ClockState {
    entity: Rc<Entity>,

    now: Cell<f64>,

    /// Queue of futures waiting for the right time.
    queue: RefCell<EventQueue>,

    /// The task currently being polled. Delays record it when they schedule
    /// themselves so that equal-time wakeups resume in spawn order.
    current_task: Cell<TaskId>,
}

impl ClockState {
    #[must_use]
    pub fn new(entity: Rc<Entity>) -> Self {
        Self {
            entity,
            now: Cell::new(0.0),
            queue: RefCell::new(EventQueue::new()),
            current_task: Cell::new(0),
        }
    }

    fn schedule(&self, at: f64, cx: &mut Context<'_>) {
        self.queue
            .borrow_mut()
            .push(at, self.current_task.get(), cx.waker().clone());
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn time_now(&self) -> f64 {
        self.now.get()
    }

    pub(crate) fn set_current_task(&self, task: TaskId) {
        self.current_task.set(task);
    }

    pub(crate) fn next_time(&self) -> Option<f64> {
        self.queue.borrow().next_time()
    }

    pub(crate) fn advance_to(&self, time: f64) {
        let now = self.now.get();
        assert!(time >= now, "Time moving backwards");
        if time != now {
            self.now.set(time);
            set_time!(self.entity ; time);
        }
    }

    pub(crate) fn pop_due(&self, time: f64) -> Vec<Waker> {
        self.queue.borrow_mut().pop_due(time)
    }

    /// Drop every pending wakeup, returning how many there were.
    pub(crate) fn discard_pending(&self) -> usize {
        let pending = std::mem::take(&mut *self.queue.borrow_mut());
        pending.len()
    }
}

/// A view of the virtual timeline with a fixed tick duration.
#[derive(Clone)]
pub struct Clock {
    /// Duration of one tick in virtual time units.
    tick_duration: f64,

    shared_state: Rc<ClockState>,
}

impl Clock {
    pub(crate) fn new(tick_duration: f64, shared_state: Rc<ClockState>) -> Self {
        Self {
            tick_duration,
            shared_state,
        }
    }

    /// Returns the duration of one tick.
    #[must_use]
    pub fn tick_duration(&self) -> f64 {
        self.tick_duration
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn time_now(&self) -> f64 {
        self.shared_state.time_now()
    }

    /// Returns the number of whole ticks elapsed.
    #[must_use]
    pub fn tick_now(&self) -> u64 {
        (self.time_now() / self.tick_duration).floor() as u64
    }

    /// Convert a number of ticks into virtual time.
    #[must_use]
    pub fn ticks_to_time(&self, ticks: u64) -> f64 {
        ticks as f64 * self.tick_duration
    }

    /// Returns a [Delay] future which must be `await`ed to delay the given
    /// amount of virtual time. Negative or NaN delays are treated as zero.
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    pub fn wait(&self, delay: f64) -> Delay {
        let delay = if delay > 0.0 { delay } else { 0.0 };
        Delay {
            shared_state: self.shared_state.clone(),
            until: self.time_now() + delay,
            state: DelayState::Pending,
        }
    }

    /// Returns a [Delay] future which must be `await`ed to delay the
    /// specified number of ticks.
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    pub fn wait_ticks(&self, ticks: u64) -> Delay {
        self.wait(self.ticks_to_time(ticks))
    }
}

/// Possible states of a Delay.
enum DelayState {
    Pending,
    Running,
}

/// Future returned by the clock to manage advancing time using async functions.
pub struct Delay {
    shared_state: Rc<ClockState>,
    until: f64,
    state: DelayState,
}

impl Future for Delay {
    type Output = ();
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.state {
            DelayState::Pending => {
                self.shared_state.schedule(self.until, cx);
                self.state = DelayState::Running;
                Poll::Pending
            }
            DelayState::Running => {
                debug_assert!(self.shared_state.time_now() >= self.until);
                Poll::Ready(())
            }
        }
    }
}
