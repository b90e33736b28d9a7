// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use aloha_engine::engine::Engine;
use aloha_engine::test_helpers::start_test;
use aloha_engine::time::clock::Clock;
use aloha_engine::traits::Runnable;
use aloha_engine::types::SimResult;
use aloha_engine::{run_simulation, sim_error};
use async_trait::async_trait;

fn spawn_ticker(engine: &Engine, count: &Rc<Cell<u64>>) {
    let clk = engine.default_clock();
    let count = count.clone();
    engine.spawn(async move {
        for _ in 0..1000 {
            clk.wait_ticks(1).await;
            count.set(count.get() + 1);
        }
        Ok(())
    });
}

#[test]
fn empty_run_leaves_time_at_zero() {
    let mut engine = start_test(file!());
    run_simulation!(engine);
    assert_eq!(engine.time_now(), 0.0);
}

#[test]
fn empty_run_until_moves_to_horizon() {
    let mut engine = start_test(file!());
    engine.run_until(12.5).unwrap();
    assert_eq!(engine.time_now(), 12.5);
}

#[test]
fn horizon_stops_between_events() {
    let mut engine = start_test(file!());
    let count = Rc::new(Cell::new(0));
    spawn_ticker(&engine, &count);

    engine.run_until(5.5).unwrap();
    assert_eq!(count.get(), 5);
    assert_eq!(engine.time_now(), 5.5);
}

#[test]
fn events_at_horizon_are_not_run() {
    let mut engine = start_test(file!());
    let count = Rc::new(Cell::new(0));
    spawn_ticker(&engine, &count);

    engine.run_until(5.0).unwrap();
    assert_eq!(count.get(), 4);
    assert_eq!(engine.time_now(), 5.0);
}

#[test]
fn pending_tasks_are_dropped_at_horizon() {
    let mut engine = start_test(file!());
    let count = Rc::new(Cell::new(0));
    spawn_ticker(&engine, &count);
    spawn_ticker(&engine, &count);
    assert_eq!(Rc::strong_count(&count), 3);

    engine.run_until(3.5).unwrap();
    assert_eq!(count.get(), 6);
    assert_eq!(Rc::strong_count(&count), 1);
}

#[test]
fn error_aborts_run() {
    let mut engine = start_test(file!());
    let count = Rc::new(Cell::new(0));
    spawn_ticker(&engine, &count);

    let clk = engine.default_clock();
    engine.spawn(async move {
        clk.wait(2.5).await;
        sim_error!("lost the channel")
    });

    run_simulation!(engine, "Error: lost the channel");
    assert_eq!(count.get(), 2);
    assert_eq!(engine.time_now(), 2.5);
    assert_eq!(Rc::strong_count(&count), 1);
}

struct Recorder {
    index: usize,
    clock: Clock,
    order: Rc<RefCell<Vec<usize>>>,
}

#[async_trait(?Send)]
impl Runnable for Recorder {
    async fn run(&self) -> SimResult {
        for _ in 0..2 {
            self.clock.wait_ticks(1).await;
            self.order.borrow_mut().push(self.index);
        }
        Ok(())
    }
}

#[test]
fn registered_components_run_in_registration_order() {
    let mut engine = start_test(file!());
    let order = Rc::new(RefCell::new(Vec::new()));

    for index in [2, 0, 1] {
        engine.register(Rc::new(Recorder {
            index,
            clock: engine.default_clock(),
            order: order.clone(),
        }));
    }

    run_simulation!(engine);
    assert_eq!(*order.borrow(), vec![2, 0, 1, 2, 0, 1]);
    assert_eq!(engine.time_now(), 2.0);
}
