// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! The ALOHA engine.
//!
//! This library executes cooperative asynchronous processes against a shared
//! virtual clock. Processes are `async` blocks (or [components] implementing
//! [`Runnable`](crate::traits::Runnable)) that suspend by awaiting a
//! [`Delay`](crate::time::clock::Delay) from a
//! [`Clock`](crate::time::clock::Clock). Exactly one process runs at a time
//! and virtual time only moves forward when every process is suspended.
//!
//! # Simple Application
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use aloha_engine::engine::Engine;
//! use aloha_track::tracker::dev_null_tracker;
//!
//! let mut engine = Engine::new(&dev_null_tracker());
//! let clock = engine.default_clock();
//! let ticks = Rc::new(Cell::new(0));
//! {
//!     let ticks = ticks.clone();
//!     engine.spawn(async move {
//!         loop {
//!             clock.wait_ticks(1).await;
//!             ticks.set(ticks.get() + 1);
//!             if ticks.get() == 1000 {
//!                 return Ok(());
//!             }
//!         }
//!     });
//! }
//! engine.run_until(10.5).unwrap();
//! assert_eq!(ticks.get(), 10);
//! assert_eq!(engine.time_now(), 10.5);
//! ```
//!
//! [components]: crate::types::Component

pub mod engine;
pub mod executor;
pub mod test_helpers;
pub mod time;
pub mod traits;
pub mod types;

#[macro_export]
/// Spawn all component run() functions and then run the simulation.
macro_rules! run_simulation {
    ($engine:ident) => {
        $engine.run().unwrap();
    };
    ($engine:ident, $expect:expr) => {
        match $engine.run() {
            Ok(()) => panic!("Expected an error!"),
            Err(e) => assert_eq!(format!("{e}").as_str(), $expect),
        }
    };
}
