// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Single-threaded executor.
//!
//! Tasks are polled in the order they became ready. Whenever no task is ready
//! the executor advances virtual time to the earliest pending wakeup and wakes
//! every task due at that instant, lowest task ID first.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use aloha_track::entity::Entity;
use aloha_track::{debug, trace};

use crate::time::clock::{Clock, ClockState};
use crate::time::queue::TaskId;
use crate::types::SimResult;

static VTABLE: RawWakerVTable =
    RawWakerVTable::new(clone_raw_waker, wake_task, wake_task_by_ref, drop_raw_waker);

fn waker_for_task(task: Rc<Task>) -> Waker {
    let ptr = Rc::into_raw(task) as *const ();
    unsafe { Waker::from_raw(RawWaker::new(ptr, &VTABLE)) }
}

unsafe fn clone_raw_waker(data: *const ()) -> RawWaker {
    unsafe {
        // Tasks are always wrapped in a reference counter so the waker owns
        // one strong count.
        Rc::increment_strong_count(data as *const Task);
    }
    RawWaker::new(data, &VTABLE)
}

unsafe fn wake_task(data: *const ()) {
    let rc_task = unsafe { Rc::from_raw(data as *const Task) };
    let state = rc_task.executor_state.clone();
    state.new_tasks.borrow_mut().push(rc_task);
}

unsafe fn wake_task_by_ref(data: *const ()) {
    unsafe {
        Rc::increment_strong_count(data as *const Task);
        wake_task(data);
    }
}

unsafe fn drop_raw_waker(data: *const ()) {
    unsafe {
        drop(Rc::from_raw(data as *const Task));
    }
}

struct Task {
    id: TaskId,
    future: RefCell<Pin<Box<dyn Future<Output = SimResult>>>>,
    executor_state: Rc<ExecutorState>,
}

impl Task {
    fn new(
        id: TaskId,
        future: impl Future<Output = SimResult> + 'static,
        executor_state: Rc<ExecutorState>,
    ) -> Task {
        Task {
            id,
            future: RefCell::new(Box::pin(future)),
            executor_state,
        }
    }

    fn poll(&self, context: &mut Context) -> Poll<SimResult> {
        self.future.borrow_mut().as_mut().poll(context)
    }
}

struct ExecutorState {
    task_queue: RefCell<Vec<Rc<Task>>>,
    new_tasks: RefCell<Vec<Rc<Task>>>,
    next_task_id: Cell<TaskId>,
    time: Rc<ClockState>,
}

impl ExecutorState {
    fn new(time: Rc<ClockState>) -> Self {
        Self {
            task_queue: RefCell::new(Vec::new()),
            new_tasks: RefCell::new(Vec::new()),
            next_task_id: Cell::new(0),
            time,
        }
    }

    fn spawn(self: &Rc<Self>, future: impl Future<Output = SimResult> + 'static) {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.new_tasks
            .borrow_mut()
            .push(Rc::new(Task::new(id, future, self.clone())));
    }
}

/// Single-threaded executor
///
/// This is a thin-wrapper (using [`Rc`]) around the real executor, so that this
/// struct can be cloned and passed around.
///
/// See the [module documentation] for more details.
///
/// [module documentation]: index.html
#[derive(Clone)]
pub struct Executor {
    pub entity: Rc<Entity>,
    state: Rc<ExecutorState>,
}

impl Executor {
    pub fn spawn(&self, future: impl Future<Output = SimResult> + 'static) {
        self.state.spawn(future);
    }

    /// Run until no events remain or, given a horizon, until the next event
    /// is not strictly before it. In the latter case time is left at the
    /// horizon. Any still-pending tasks are dropped when the run ends.
    pub fn run(&self, horizon: Option<f64>) -> SimResult {
        let result = self.run_events(horizon);
        self.discard_pending();
        result
    }

    fn run_events(&self, horizon: Option<f64>) -> SimResult {
        let time = &self.state.time;
        loop {
            self.step()?;

            if !self.state.new_tasks.borrow().is_empty() {
                continue;
            }

            match time.next_time() {
                Some(next) if horizon.is_none_or(|h| next < h) => {
                    time.advance_to(next);
                    for waker in time.pop_due(next) {
                        waker.wake();
                    }
                }
                _ => {
                    if let Some(h) = horizon.filter(|h| *h > time.time_now()) {
                        time.advance_to(h);
                    }
                    break;
                }
            }
        }
        Ok(())
    }

    fn step(&self) -> SimResult {
        // Append new tasks created since the last step into the task queue
        let mut task_queue = self.state.task_queue.borrow_mut();
        task_queue.append(&mut self.state.new_tasks.borrow_mut());

        for task in task_queue.drain(..) {
            self.state.time.set_current_task(task.id);
            let waker = waker_for_task(task.clone());
            let mut context = Context::from_waker(&waker);

            match task.poll(&mut context) {
                Poll::Ready(Err(e)) => {
                    // Error - return early
                    return Err(e);
                }
                Poll::Ready(Ok(())) => {
                    trace!(self.entity ; "task {} complete", task.id);
                }
                Poll::Pending => {
                    // Task will have parked itself waiting on a clock
                }
            }
        }
        Ok(())
    }

    fn discard_pending(&self) {
        let ready = std::mem::take(&mut *self.state.new_tasks.borrow_mut());
        let waiting = self.state.time.discard_pending();
        if !ready.is_empty() || waiting > 0 {
            debug!(self.entity ; "discarding {} pending tasks", ready.len() + waiting);
        }
        drop(ready);
        self.state.task_queue.borrow_mut().clear();
    }

    pub fn clock(&self, tick_duration: f64) -> Clock {
        Clock::new(tick_duration, self.state.time.clone())
    }

    pub fn time_now(&self) -> f64 {
        self.state.time.time_now()
    }
}

/// `Spawner` spawns new futures into the executor.
#[derive(Clone)]
pub struct Spawner {
    state: Rc<ExecutorState>,
}

impl Spawner {
    pub fn spawn(&self, future: impl Future<Output = SimResult> + 'static) {
        self.state.spawn(future);
    }
}

pub fn new_executor_and_spawner(top: &Rc<Entity>) -> (Executor, Spawner) {
    let time = Rc::new(ClockState::new(Rc::new(Entity::new(top, "time"))));
    let state = Rc::new(ExecutorState::new(time));
    let entity = Rc::new(Entity::new(top, "executor"));
    (
        Executor {
            entity,
            state: state.clone(),
        },
        Spawner { state },
    )
}
