// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Slotted-ALOHA models.
//!
//! A fixed population of [hosts](crate::host::Host) share a single channel
//! divided into slots. Packets arrive at each host as a Poisson process and
//! the head-of-queue packet of every host is transmitted in its scheduled
//! slot. A slot with exactly one transmission is a success; two or more
//! transmissions collide and each host involved backs off according to the
//! chosen [backoff algorithm](crate::backoff::Backoff).
//!
//! # Example
//!
//! ```rust
//! use aloha_models::backoff::Backoff;
//! use aloha_models::simulation::{SimulationConfig, simulate};
//! use aloha_track::tracker::dev_null_tracker;
//!
//! let config = SimulationConfig {
//!     horizon: 1000.0,
//!     backoff: Backoff::Linear,
//!     ..SimulationConfig::default()
//! };
//! let result = simulate(&dev_null_tracker(), &config).unwrap();
//! assert_eq!(result.stats.slots, 1000);
//! assert!(result.throughput() <= 1.0);
//! ```

pub mod arrival;
pub mod backoff;
pub mod collision;
pub mod host;
pub mod packet;
pub mod simulation;
pub mod state;
pub mod throughput;
