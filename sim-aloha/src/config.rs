// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Configuration of an arrival-rate sweep.
//!
//! Values are layered from several sources, later sources taking priority:
//!
//!  1. the built-in defaults,
//!  2. an optional TOML file given with `--conf-file`,
//!  3. environment variables prefixed with `ALOHA_` (e.g. `ALOHA_NUM_HOSTS=4`),
//!  4. command-line arguments.
//!
//! Every field is an `Option` so that a source only overrides the values it
//! actually sets.

use std::path::{Path, PathBuf};

use aloha_engine::sim_error;
use aloha_engine::types::SimError;
use aloha_models::backoff::Backoff;
use aloha_models::simulation::SimulationConfig;
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables read.
pub const ENV_PREFIX: &str = "ALOHA_";

#[derive(Parser, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Seed for every random stream of a run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of hosts sharing the channel.
    #[arg(long)]
    pub num_hosts: Option<usize>,

    /// Duration of one slot in virtual time units.
    #[arg(long)]
    pub slot_duration: Option<f64>,

    /// Virtual time at which each run stops.
    #[arg(long)]
    pub horizon: Option<f64>,

    /// Comma-separated packet arrival rates to sweep.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub arrival_rates: Option<Vec<f64>>,

    /// TOML file containing configuration values.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conf_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: Some(1),
            num_hosts: Some(10),
            slot_duration: Some(1.0),
            horizon: Some(100_000.0),
            arrival_rates: Some((1..=9).map(|i| f64::from(i) / 100.0).collect()),
            conf_file: None,
        }
    }
}

impl Config {
    /// Merge every configuration source. `cli` holds the parsed command line.
    pub fn from_sources(cli: Config) -> Result<Config, SimError> {
        let mut figment = Config::figment_with_defaults();
        if let Some(conf_file) = &cli.conf_file {
            if !conf_file.is_file() {
                return sim_error!(format!(
                    "configuration file {} not found",
                    conf_file.display()
                ));
            }
            figment = Config::figment_conf_file_merge(figment, conf_file);
        }
        figment = Config::figment_env_var_merge(figment);
        let config = Config::figment_extract(figment)?;
        Ok(Config::clap_merge(config, cli))
    }

    fn figment_with_defaults() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    fn figment_conf_file_merge(config: Figment, conf_file: &Path) -> Figment {
        config.merge(Toml::file(conf_file))
    }

    fn figment_env_var_merge(config: Figment) -> Figment {
        config.merge(Env::prefixed(ENV_PREFIX))
    }

    fn figment_extract(config: Figment) -> Result<Config, SimError> {
        config
            .extract()
            .map_err(|e| SimError(format!("invalid configuration: {e}")))
    }

    /// Command-line values take priority over everything else.
    fn clap_merge(mut config: Config, cli: Config) -> Config {
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        if cli.num_hosts.is_some() {
            config.num_hosts = cli.num_hosts;
        }
        if cli.slot_duration.is_some() {
            config.slot_duration = cli.slot_duration;
        }
        if cli.horizon.is_some() {
            config.horizon = cli.horizon;
        }
        if cli.arrival_rates.is_some() {
            config.arrival_rates = cli.arrival_rates;
        }
        if cli.conf_file.is_some() {
            config.conf_file = cli.conf_file;
        }
        config
    }

    /// Check the merged configuration and turn it into a [`SweepConfig`].
    pub fn validate(&self) -> Result<SweepConfig, SimError> {
        let defaults = Config::default();
        let sweep = SweepConfig {
            seed: self.seed.or(defaults.seed).unwrap_or_default(),
            num_hosts: self.num_hosts.or(defaults.num_hosts).unwrap_or_default(),
            slot_duration: self
                .slot_duration
                .or(defaults.slot_duration)
                .unwrap_or_default(),
            horizon: self.horizon.or(defaults.horizon).unwrap_or_default(),
            arrival_rates: self
                .arrival_rates
                .clone()
                .or(defaults.arrival_rates)
                .unwrap_or_default(),
        };

        if sweep.arrival_rates.is_empty() {
            return sim_error!("no arrival rates to sweep");
        }
        for arrival_rate in &sweep.arrival_rates {
            for backoff in Backoff::ALL {
                sweep.simulation_config(*arrival_rate, backoff).validate()?;
            }
        }
        Ok(sweep)
    }
}

/// A validated sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig {
    pub seed: u64,
    pub num_hosts: usize,
    pub slot_duration: f64,
    pub horizon: f64,
    pub arrival_rates: Vec<f64>,
}

impl SweepConfig {
    /// Parameters of the run for one arrival rate and algorithm.
    #[must_use]
    pub fn simulation_config(&self, arrival_rate: f64, backoff: Backoff) -> SimulationConfig {
        SimulationConfig {
            num_hosts: self.num_hosts,
            arrival_rate,
            slot_duration: self.slot_duration,
            horizon: self.horizon,
            backoff,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let sweep = Config::default().validate().unwrap();
        assert_eq!(sweep.seed, 1);
        assert_eq!(sweep.num_hosts, 10);
        assert_eq!(sweep.slot_duration, 1.0);
        assert_eq!(sweep.horizon, 100_000.0);
        assert_eq!(
            sweep.arrival_rates,
            vec![0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.09]
        );
    }

    #[test]
    fn command_line_wins() {
        let cli = Config::try_parse_from([
            "sim-aloha",
            "--num-hosts",
            "4",
            "--arrival-rates",
            "0.1,0.2",
        ])
        .unwrap();
        let merged = Config::clap_merge(Config::default(), cli);
        assert_eq!(merged.num_hosts, Some(4));
        assert_eq!(merged.arrival_rates, Some(vec![0.1, 0.2]));
        assert_eq!(merged.seed, Some(1));
    }

    #[test]
    fn unset_command_line_keeps_values() {
        let cli = Config::try_parse_from(["sim-aloha"]).unwrap();
        assert_eq!(Config::clap_merge(Config::default(), cli), Config::default());
    }

    #[test]
    fn bad_values_are_rejected() {
        let bad = [
            Config {
                num_hosts: Some(0),
                ..Config::default()
            },
            Config {
                arrival_rates: Some(vec![]),
                ..Config::default()
            },
            Config {
                arrival_rates: Some(vec![0.01, -0.5]),
                ..Config::default()
            },
            Config {
                horizon: Some(0.0),
                ..Config::default()
            },
            Config {
                slot_duration: Some(f64::NAN),
                ..Config::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn simulation_config_for_rate() {
        let sweep = Config::default().validate().unwrap();
        let config = sweep.simulation_config(0.05, Backoff::Linear);
        assert_eq!(config.arrival_rate, 0.05);
        assert_eq!(config.backoff, Backoff::Linear);
        assert_eq!(config.num_hosts, 10);
    }
}
