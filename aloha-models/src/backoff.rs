// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Contention backoff algorithms.
//!
//! After a collision a host waits
//! `1 + min(U(0, CONTENTION_WINDOW), U(0, window(retry_count)))` slots before
//! trying again, where `U(0, n)` is a uniform integer in `[0, n)`. The two
//! algorithms only differ in how the window grows with the retry count.

use std::fmt;

use rand::Rng;

/// Upper bound on any backoff draw.
pub const CONTENTION_WINDOW: u64 = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backoff {
    /// Window of `2^retry_count` slots, saturating at `u64::MAX`.
    Exponential,

    /// Window of `retry_count` slots.
    Linear,
}

impl Backoff {
    /// Both algorithms, in reporting order.
    pub const ALL: [Backoff; 2] = [Backoff::Exponential, Backoff::Linear];

    /// The window a host draws from after `retry_count` failures.
    #[must_use]
    pub fn window(&self, retry_count: u32) -> u64 {
        match self {
            Backoff::Exponential => 1u64.checked_shl(retry_count).unwrap_or(u64::MAX),
            Backoff::Linear => u64::from(retry_count),
        }
    }

    /// Number of slots to wait before the next attempt. Always at least 1.
    ///
    /// Both uniform draws are always taken, contention window first, so the
    /// random stream consumed does not depend on the outcome of the `min`.
    pub fn delay<R: Rng + ?Sized>(&self, retry_count: u32, rng: &mut R) -> u64 {
        debug_assert!(retry_count >= 1, "backoff before any failure");
        let ceiling = uniform_below(rng, CONTENTION_WINDOW);
        let window = uniform_below(rng, self.window(retry_count));
        1 + ceiling.min(window)
    }

    /// Prefix used on per-run report lines.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        match self {
            Backoff::Exponential => "Exp",
            Backoff::Linear => "Lin",
        }
    }
}

impl fmt::Display for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backoff::Exponential => write!(f, "exponential"),
            Backoff::Linear => write!(f, "linear"),
        }
    }
}

/// Uniform integer in `[0, n)`. Ranges of width zero or one give 0 without
/// consuming any randomness.
pub fn uniform_below<R: Rng + ?Sized>(rng: &mut R, n: u64) -> u64 {
    if n <= 1 {
        return 0;
    }
    rng.gen_range(0..n)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn degenerate_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(uniform_below(&mut rng, 0), 0);
        assert_eq!(uniform_below(&mut rng, 1), 0);
    }

    #[test]
    fn degenerate_ranges_consume_nothing() {
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        uniform_below(&mut a, 1);
        assert_eq!(uniform_below(&mut a, 100), uniform_below(&mut b, 100));
    }

    #[test]
    fn draws_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(uniform_below(&mut rng, 5) < 5);
        }
    }

    #[test]
    fn windows() {
        assert_eq!(Backoff::Exponential.window(1), 2);
        assert_eq!(Backoff::Exponential.window(10), 1024);
        assert_eq!(Backoff::Exponential.window(63), 1 << 63);
        assert_eq!(Backoff::Exponential.window(64), u64::MAX);
        assert_eq!(Backoff::Exponential.window(u32::MAX), u64::MAX);
        assert_eq!(Backoff::Linear.window(1), 1);
        assert_eq!(Backoff::Linear.window(7), 7);
    }

    #[test]
    fn first_linear_retry_waits_one_slot() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            assert_eq!(Backoff::Linear.delay(1, &mut rng), 1);
        }
    }

    #[test]
    fn delays_are_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for retry_count in 1..80 {
            for backoff in Backoff::ALL {
                let delay = backoff.delay(retry_count, &mut rng);
                assert!(delay >= 1);
                assert!(delay <= CONTENTION_WINDOW);
                assert!(delay <= backoff.window(retry_count).max(1));
            }
        }
    }

    #[test]
    fn names() {
        assert_eq!(Backoff::Exponential.short_name(), "Exp");
        assert_eq!(Backoff::Linear.short_name(), "Lin");
        assert_eq!(format!("{}", Backoff::Linear), "linear");
    }
}
