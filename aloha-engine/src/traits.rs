// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A set of common traits used across the ALOHA Engine.

use async_trait::async_trait;

use crate::types::SimResult;

/// The `Runnable` trait is implemented by every component that has a process
/// to run once the simulation starts.
///
/// Components are spawned in the order in which they were registered with the
/// [`Engine`](crate::engine::Engine), which also fixes the order in which they
/// resume when they are due at the same virtual time.
#[async_trait(?Send)]
pub trait Runnable {
    /// The body of the process. Most processes never return.
    async fn run(&self) -> SimResult {
        Ok(())
    }
}
