// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

/// Fraction of transmission attempts that succeeded. Zero when nothing was
/// transmitted.
#[must_use]
pub fn throughput(successes: u64, total_attempts: u64) -> f64 {
    if total_attempts == 0 {
        return 0.0;
    }
    successes as f64 / total_attempts as f64
}
