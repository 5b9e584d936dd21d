//! TOML settings for the `cascade` binary.
//!
//! Every section and key is optional; missing values fall back to the defaults
//! below, and command-line flags take precedence over the file.
//!
//! ```toml
//! [simulation]
//! alpha = 0.1
//! seed_fraction = 0.05
//! policy = "high-degree"
//! rng_seed = 7
//! runs = 100
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use cascade_algo::SeedPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeSettings {
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Simulation defaults used when a flag is not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_seed_fraction")]
    pub seed_fraction: f64,
    #[serde(default)]
    pub policy: SeedPolicy,
    /// Fixed RNG seed; a fresh one is drawn per invocation when unset
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default)]
    pub max_rounds: Option<usize>,
    /// Runs per policy for `compare`
    #[serde(default = "default_runs")]
    pub runs: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            seed_fraction: default_seed_fraction(),
            policy: SeedPolicy::default(),
            rng_seed: None,
            max_rounds: None,
            runs: default_runs(),
        }
    }
}

fn default_alpha() -> f64 {
    0.1
}

fn default_seed_fraction() -> f64 {
    0.05
}

fn default_runs() -> usize {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingSettings {
    pub fn level(&self) -> Result<tracing::Level> {
        tracing::Level::from_str(&self.level)
            .map_err(|_| anyhow::anyhow!("unknown log level '{}'", self.level))
    }
}

impl CascadeSettings {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: CascadeSettings = toml::from_str(contents).context("parsing settings")?;
        settings.logging.level()?;
        Ok(settings)
    }
}

/// Read settings from `path`, or return the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<CascadeSettings> {
    let Some(path) = path else {
        return Ok(CascadeSettings::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file '{}'", path.display()))?;
    CascadeSettings::from_toml(&contents)
        .with_context(|| format!("loading settings from '{}'", path.display()))
}
