// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Virtual time.
//!
//! All processes share a single timeline of `f64` time units. A [`Clock`] is
//! a view of that timeline with a fixed tick duration, so that models can
//! wait a number of ticks (slots) rather than an absolute amount of time.
//!
//! [`Clock`]: crate::time::clock::Clock

pub mod clock;
pub mod queue;
