// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Compare exponential and linear backoff in slotted ALOHA.
//!
//! For every configured packet arrival rate two independent simulations are
//! run, one per backoff algorithm, each with a fresh engine and host set. The
//! throughput (successful transmissions over all transmission attempts) of the
//! two runs is reported side by side.
//!
//! See [`config`] for the configuration sources and [`sweep`] for the report
//! format.

pub mod config;
pub mod sweep;
