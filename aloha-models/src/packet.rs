// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Record of a delivered packet.

use std::fmt;

/// Emitted for every successful slot. Packet IDs are allocated sequentially
/// per run, starting at 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Packet {
    pub id: u64,

    /// Index of the host that transmitted it.
    pub host: usize,

    /// Virtual time at which the transmission succeeded.
    pub created_at: f64,
}

impl Packet {
    #[must_use]
    pub fn new(id: u64, host: usize, created_at: f64) -> Self {
        Self {
            id,
            host,
            created_at,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "packet {} from host{} at {}",
            self.id, self.host, self.created_at
        )
    }
}
