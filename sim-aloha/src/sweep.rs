// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Run both backoff algorithms for every arrival rate and report the results.
//!
//! For each rate the report contains one raw line per run followed by a small
//! table:
//!
//! ```text
//! Exp successes: 9934    Total: 11761
//! Lin successes: 10026   Total: 13220
//! Lambda     Exponential          Linear
//! 0.01       0.84466              0.7584
//! ```
//!
//! Each table is followed by a blank line.

use std::io::Write;

use aloha_engine::types::SimError;
use aloha_models::backoff::Backoff;
use aloha_models::simulation::{RunResult, simulate};
use aloha_track::entity::toplevel;
use aloha_track::{Tracker, info};

use crate::config::SweepConfig;

/// Both runs for one arrival rate.
#[derive(Clone, Debug, PartialEq)]
pub struct RateResult {
    pub arrival_rate: f64,
    pub exponential: RunResult,
    pub linear: RunResult,
}

/// Raw counters of one run, e.g. `Exp successes: 12      Total: 15     `.
#[must_use]
pub fn run_line(result: &RunResult) -> String {
    format!(
        "{} successes: {:<7} Total: {:<7}",
        result.backoff.short_name(),
        result.successes(),
        result.total_attempts()
    )
}

#[must_use]
pub fn table_header() -> String {
    format!("{:<10} {:<20} {:<20}", "Lambda", "Exponential", "Linear")
}

/// The arrival rate and both throughputs, rounded to five decimal places.
#[must_use]
pub fn table_row(arrival_rate: f64, exponential: f64, linear: f64) -> String {
    format!(
        "{:<10} {:<20} {:<20}",
        arrival_rate,
        round_to_5(exponential),
        round_to_5(linear)
    )
}

fn round_to_5(value: f64) -> f64 {
    (value * 1e5).round() / 1e5
}

fn write_line<W: Write>(out: &mut W, line: &str) -> Result<(), SimError> {
    writeln!(out, "{line}").map_err(|e| SimError(format!("failed to write report: {e}")))
}

/// Run the sweep, writing the report to `out` as each rate completes.
pub fn run_sweep<W: Write>(
    tracker: &Tracker,
    sweep: &SweepConfig,
    out: &mut W,
) -> Result<Vec<RateResult>, SimError> {
    let top = toplevel(tracker, "sweep");
    info!(top ; "Sweeping {} arrival rates with {} hosts until time {}",
        sweep.arrival_rates.len(),
        sweep.num_hosts,
        sweep.horizon);

    let mut results = Vec::with_capacity(sweep.arrival_rates.len());
    for &arrival_rate in &sweep.arrival_rates {
        let exponential = simulate(
            tracker,
            &sweep.simulation_config(arrival_rate, Backoff::Exponential),
        )?;
        write_line(out, &run_line(&exponential))?;

        let linear = simulate(
            tracker,
            &sweep.simulation_config(arrival_rate, Backoff::Linear),
        )?;
        write_line(out, &run_line(&linear))?;

        write_line(out, &table_header())?;
        write_line(
            out,
            &table_row(arrival_rate, exponential.throughput(), linear.throughput()),
        )?;
        write_line(out, "")?;

        results.push(RateResult {
            arrival_rate,
            exponential,
            linear,
        });
    }
    out.flush()
        .map_err(|e| SimError(format!("failed to write report: {e}")))?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use aloha_models::state::RunStats;

    use super::*;

    fn result(backoff: Backoff, successes: u64, failures: u64) -> RunResult {
        RunResult {
            backoff,
            arrival_rate: 0.01,
            stats: RunStats {
                successes,
                failures,
                ..RunStats::default()
            },
            hosts: Vec::new(),
        }
    }

    #[test]
    fn raw_lines() {
        assert_eq!(
            run_line(&result(Backoff::Exponential, 9934, 1827)),
            "Exp successes: 9934    Total: 11761  "
        );
        assert_eq!(
            run_line(&result(Backoff::Linear, 0, 0)),
            "Lin successes: 0       Total: 0      "
        );
    }

    #[test]
    fn header() {
        assert_eq!(
            table_header(),
            "Lambda     Exponential          Linear              "
        );
    }

    #[test]
    fn row_is_rounded() {
        assert_eq!(
            table_row(0.01, 0.8446560666609982, 0.0),
            "0.01       0.84466              0                   "
        );
        assert_eq!(
            table_row(0.09, 0.5, 0.147926),
            "0.09       0.5                  0.14793             "
        );
    }
}
