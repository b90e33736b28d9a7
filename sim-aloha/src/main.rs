// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Sweep packet arrival rates over a slotted-ALOHA channel.
//!
//! See `lib.rs` for details.

use std::io;

use aloha_engine::types::SimError;
use aloha_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use aloha_track::{Track, Tracker};
use clap::Parser;
use sim_aloha::config::Config;
use sim_aloha::sweep::run_sweep;

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Slotted-ALOHA exponential vs linear backoff comparison")]
struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entites should have logging level set
    /// to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// Enable logging to a text file.
    #[arg(long, default_value = "false")]
    log: bool,

    /// Level of log message to write to the file.
    #[arg(long, default_value = "Debug")]
    log_level: log::Level,

    /// Set a regular expression for which entites should have file logging
    /// level set to `--log-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    log_filter_regex: String,

    /// The filename log output is written to.
    #[arg(long, default_value = "aloha.log")]
    log_file: String,

    #[command(flatten)]
    config: Config,
}

fn setup_all_trackers(args: &Cli) -> Result<Tracker, SimError> {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: args.stdout,
            level: args.stdout_level,
            filter_regex: &args.stdout_filter_regex,
            file: None,
        },
        file: TrackerConfig {
            enable: args.log,
            level: args.log_level,
            filter_regex: &args.log_filter_regex,
            file: Some(&args.log_file),
        },
    };
    Ok(setup_trackers(&config)?)
}

fn main() -> Result<(), SimError> {
    let args = Cli::parse();
    let tracker = setup_all_trackers(&args)?;

    let sweep = Config::from_sources(args.config)?.validate()?;

    let stdout = io::stdout();
    let result = run_sweep(&tracker, &sweep, &mut stdout.lock());
    tracker.shutdown();
    result.map(|_| ())
}
