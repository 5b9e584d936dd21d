use cascade_algo::{CascadeConfig, SeedPolicy};
use cascade_core::CascadeError;
use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

use crate::config::SimulationSettings;

#[derive(Parser, Debug)]
#[command(name = "cascade", author, version, about = "Cascading failure simulation over grid topologies", long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// TOML settings file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Worker threads for ensembles ("auto" or a count)
    #[arg(long, global = true, default_value = "auto")]
    pub threads: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one cascade and report its degradation series
    Run(RunArgs),
    /// Compare seed policies over repeated runs
    Compare(CompareArgs),
    /// Topology statistics and the highest-ranked buses
    Stats(StatsArgs),
}

/// Bus and branch tables to build the topology from.
#[derive(Args, Debug, Clone)]
pub struct TopologyArgs {
    /// Bus table (CSV with a `Bus ID` column)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub buses: PathBuf,
    /// Branch table (CSV with `From Bus` and `To Bus` columns)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub branches: PathBuf,
}

/// Simulation parameters; unset values come from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// Transmission probability per failed-to-functional neighbour attempt
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Share of buses failed before the first round
    #[arg(long)]
    pub seed_fraction: Option<f64>,
    /// Stop after this many propagation rounds
    #[arg(long)]
    pub max_rounds: Option<usize>,
    /// Seed for the random number generator (random if unset)
    #[arg(long)]
    pub rng_seed: Option<u64>,
}

impl SimulationArgs {
    /// Merge with file settings; command-line values win.
    pub fn resolve(&self, defaults: &SimulationSettings, policy: Option<SeedPolicy>) -> CascadeConfig {
        CascadeConfig {
            alpha: self.alpha.unwrap_or(defaults.alpha),
            seed_fraction: self.seed_fraction.unwrap_or(defaults.seed_fraction),
            policy: policy.unwrap_or(defaults.policy),
            max_rounds: self.max_rounds.or(defaults.max_rounds),
        }
    }

    pub fn rng_seed(&self, defaults: &SimulationSettings) -> Option<u64> {
        self.rng_seed.or(defaults.rng_seed)
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,
    #[command(flatten)]
    pub simulation: SimulationArgs,
    /// Seed policy: random, high-degree or high-betweenness
    #[arg(long, value_parser = parse_policy)]
    pub policy: Option<SeedPolicy>,
    /// Write the series to a file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,
    #[command(flatten)]
    pub simulation: SimulationArgs,
    /// Comma-separated policies to compare (default: all)
    #[arg(long, value_delimiter = ',', value_parser = parse_policy)]
    pub policies: Vec<SeedPolicy>,
    /// Runs per policy
    #[arg(long)]
    pub runs: Option<usize>,
    /// Write the summary table as CSV
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
    /// Write mean degradation curves as CSV
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub curves: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub topology: TopologyArgs,
    /// How many top-ranked buses to list per measure
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

fn parse_policy(value: &str) -> Result<SeedPolicy, CascadeError> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compare_parses_policy_list() {
        let cli = Cli::parse_from([
            "cascade",
            "compare",
            "--buses",
            "bus.csv",
            "--branches",
            "branch.csv",
            "--policies",
            "random,degree",
        ]);
        match cli.command {
            Commands::Compare(args) => assert_eq!(
                args.policies,
                vec![SeedPolicy::Random, SeedPolicy::HighDegree]
            ),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = Cli::try_parse_from([
            "cascade",
            "run",
            "--buses",
            "bus.csv",
            "--branches",
            "branch.csv",
            "--policy",
            "closeness",
        ]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Unsupported seed policy"), "{err}");
    }

    #[test]
    fn test_flags_override_settings() {
        let defaults = SimulationSettings::default();
        let args = SimulationArgs {
            alpha: Some(0.9),
            ..SimulationArgs::default()
        };
        let config = args.resolve(&defaults, Some(SeedPolicy::HighBetweenness));
        assert_eq!(config.alpha, 0.9);
        assert_eq!(config.seed_fraction, defaults.seed_fraction);
        assert_eq!(config.policy, SeedPolicy::HighBetweenness);
    }
}
