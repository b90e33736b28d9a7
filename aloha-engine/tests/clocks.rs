// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use aloha_engine::test_helpers::start_test;

/// Test that runs different clocks that add to a shared vector and then checks
/// that everything has been done in the correct order and at the right times.
#[test]
fn dual_clock() {
    let mut engine = start_test(file!());

    let clk1 = engine.clock(1.0);
    let clk2 = engine.clock(0.75);

    let all_values = Rc::new(RefCell::new(Vec::new()));

    let values = all_values.clone();
    engine.spawn(async move {
        for _ in 0..4 {
            clk1.wait_ticks(1).await;
            values.borrow_mut().push((1, clk1.time_now()));
        }
        Ok(())
    });

    let values = all_values.clone();
    engine.spawn(async move {
        for _ in 0..4 {
            clk2.wait_ticks(1).await;
            values.borrow_mut().push((2, clk2.time_now()));
        }
        Ok(())
    });

    engine.run().unwrap();

    assert_eq!(
        vec![
            (2, 0.75),
            (1, 1.0),
            (2, 1.5),
            (1, 2.0),
            (2, 2.25),
            (1, 3.0),
            (2, 3.0),
            (1, 4.0),
        ],
        *all_values.borrow()
    );
    assert_eq!(engine.time_now(), 4.0);
}

/// Tasks due at the same instant resume in spawn order, regardless of when
/// they scheduled their wakeup.
#[test]
fn same_instant_follows_spawn_order() {
    let mut engine = start_test(file!());
    let order = Rc::new(RefCell::new(Vec::new()));

    // Each task reaches time 3.0 but schedules that wakeup at a different time.
    let splits: [&[u64]; 3] = [&[3], &[1, 2], &[2, 1]];
    for (i, waits) in splits.into_iter().enumerate() {
        let clk = engine.default_clock();
        let order = order.clone();
        engine.spawn(async move {
            for ticks in waits {
                clk.wait_ticks(*ticks).await;
            }
            order.borrow_mut().push((i, clk.time_now()));
            Ok(())
        });
    }

    {
        let clk = engine.default_clock();
        let order = order.clone();
        engine.spawn(async move {
            clk.wait(3.0).await;
            order.borrow_mut().push((3, clk.time_now()));
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(
        *order.borrow(),
        vec![(0, 3.0), (1, 3.0), (2, 3.0), (3, 3.0)]
    );
}

#[test]
fn zero_and_negative_waits_do_not_advance_time() {
    let mut engine = start_test(file!());
    let clk = engine.default_clock();
    let times = Rc::new(RefCell::new(Vec::new()));

    {
        let times = times.clone();
        engine.spawn(async move {
            clk.wait(2.5).await;
            times.borrow_mut().push(clk.time_now());
            clk.wait(0.0).await;
            times.borrow_mut().push(clk.time_now());
            clk.wait(-1.0).await;
            times.borrow_mut().push(clk.time_now());
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(*times.borrow(), vec![2.5, 2.5, 2.5]);
}

#[test]
fn tick_now_counts_whole_ticks() {
    let mut engine = start_test(file!());
    let clk = engine.clock(2.0);
    let ticks = Rc::new(RefCell::new(Vec::new()));

    {
        let ticks = ticks.clone();
        engine.spawn(async move {
            clk.wait(3.0).await;
            ticks.borrow_mut().push(clk.tick_now());
            clk.wait_ticks(2).await;
            ticks.borrow_mut().push(clk.tick_now());
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(*ticks.borrow(), vec![1, 3]);
    assert_eq!(engine.time_now(), 7.0);
}
