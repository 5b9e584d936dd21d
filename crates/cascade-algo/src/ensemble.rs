//! Repeated independent runs and seed-policy comparison.
//!
//! Run `i` of an ensemble draws from `StdRng::seed_from_u64(base_seed + i)`, so the
//! result of every run depends only on its index. With the `parallel` feature runs
//! execute on the rayon pool (one status layer per task, shared topology and
//! betweenness cache); outcomes are always returned in run order.

use cascade_core::{CascadeError, CascadeResult, Topology};
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cascade::{CascadeConfig, CascadeEngine, CascadeOutcome, DegradationSample};
use crate::seed::SeedPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ensemble {
    pub runs: usize,
    pub base_seed: u64,
}

impl Ensemble {
    pub fn new(runs: usize, base_seed: u64) -> Self {
        Self { runs, base_seed }
    }

    /// RNG for run `run`.
    pub fn rng_for(&self, run: usize) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(run as u64))
    }

    /// Execute every run of `config` on `engine`.
    pub fn run(
        &self,
        engine: &CascadeEngine<'_>,
        config: &CascadeConfig,
    ) -> CascadeResult<Vec<CascadeOutcome>> {
        if self.runs == 0 {
            return Err(CascadeError::InvalidParameter(
                "an ensemble needs at least one run".to_string(),
            ));
        }
        config.validate()?;

        let simulate = |run: usize| {
            let mut rng = self.rng_for(run);
            engine.run(config, &mut rng)
        };

        #[cfg(feature = "parallel")]
        let outcomes: CascadeResult<Vec<CascadeOutcome>> =
            (0..self.runs).into_par_iter().map(simulate).collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: CascadeResult<Vec<CascadeOutcome>> = (0..self.runs).map(simulate).collect();

        outcomes
    }

    /// Execute every run and aggregate the results.
    pub fn summarize(
        &self,
        engine: &CascadeEngine<'_>,
        config: &CascadeConfig,
    ) -> CascadeResult<EnsembleSummary> {
        let outcomes = self.run(engine, config)?;
        let summary = EnsembleSummary::from_outcomes(config.policy, &outcomes);
        info!(
            policy = %summary.policy,
            runs = summary.runs,
            mean_failed_percent = summary.mean_failed_percent,
            mean_final_llc = summary.mean_final_llc,
            "ensemble finished"
        );
        Ok(summary)
    }
}

impl Default for Ensemble {
    fn default() -> Self {
        Self::new(100, 42)
    }
}

/// Averaged degradation point across an ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub failed_percent: f64,
    pub llc_size: f64,
}

/// Aggregate statistics of one ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    pub policy: SeedPolicy,
    pub runs: usize,
    pub mean_failed_percent: f64,
    pub min_failed_percent: f64,
    pub max_failed_percent: f64,
    pub mean_rounds: f64,
    pub mean_final_llc: f64,
    /// `mean_curve[k]` averages sample `k` of every run; runs that ended earlier
    /// contribute their last sample
    pub mean_curve: Vec<CurvePoint>,
}

impl EnsembleSummary {
    pub fn from_outcomes(policy: SeedPolicy, outcomes: &[CascadeOutcome]) -> Self {
        let runs = outcomes.len();
        if runs == 0 {
            return Self {
                policy,
                runs,
                mean_failed_percent: 0.0,
                min_failed_percent: 0.0,
                max_failed_percent: 0.0,
                mean_rounds: 0.0,
                mean_final_llc: 0.0,
                mean_curve: Vec::new(),
            };
        }
        let count = runs as f64;
        let failed: Vec<f64> = outcomes
            .iter()
            .map(CascadeOutcome::final_failed_percent)
            .collect();
        let longest = outcomes.iter().map(|o| o.series.len()).max().unwrap_or(0);
        let mean_curve = (0..longest)
            .map(|k| {
                let (percent, llc) = outcomes
                    .iter()
                    .filter_map(|o| o.series.get(k).or_else(|| o.series.last()))
                    .fold((0.0, 0.0), |(p, l), s: &DegradationSample| {
                        (p + s.failed_percent, l + s.llc_size as f64)
                    });
                CurvePoint {
                    failed_percent: percent / count,
                    llc_size: llc / count,
                }
            })
            .collect();

        Self {
            policy,
            runs,
            mean_failed_percent: failed.iter().sum::<f64>() / count,
            min_failed_percent: failed.iter().copied().fold(f64::INFINITY, f64::min),
            max_failed_percent: failed.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean_rounds: outcomes.iter().map(|o| o.rounds as f64).sum::<f64>() / count,
            mean_final_llc: outcomes.iter().map(|o| o.final_llc as f64).sum::<f64>() / count,
            mean_curve,
        }
    }
}

/// Run one ensemble per policy over the same topology. Betweenness is computed at
/// most once because every ensemble shares one engine.
pub fn compare_policies(
    topology: &Topology,
    base: &CascadeConfig,
    policies: &[SeedPolicy],
    ensemble: &Ensemble,
) -> CascadeResult<Vec<EnsembleSummary>> {
    let engine = CascadeEngine::new(topology);
    policies
        .iter()
        .map(|&policy| ensemble.summarize(&engine, &base.clone().with_policy(policy)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(side: usize) -> Topology {
        let mut edges = Vec::new();
        for r in 0..side {
            for c in 0..side {
                let id = r * side + c;
                if c + 1 < side {
                    edges.push((id, id + 1));
                }
                if r + 1 < side {
                    edges.push((id, id + side));
                }
            }
        }
        Topology::from_edges(0..side * side, edges).unwrap()
    }

    #[test]
    fn test_ensemble_runs_are_reproducible() {
        let topology = grid(5);
        let engine = CascadeEngine::new(&topology);
        let config = CascadeConfig::new(0.4, 0.08, SeedPolicy::Random);
        let ensemble = Ensemble::new(16, 7);
        let first = ensemble.run(&engine, &config).unwrap();
        let second = ensemble.run(&engine, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
    }

    #[test]
    fn test_run_order_matches_sequential_execution() {
        let topology = grid(4);
        let engine = CascadeEngine::new(&topology);
        let config = CascadeConfig::new(0.5, 0.1, SeedPolicy::Random);
        let ensemble = Ensemble::new(8, 100);
        let outcomes = ensemble.run(&engine, &config).unwrap();
        for (run, outcome) in outcomes.iter().enumerate() {
            let mut rng = ensemble.rng_for(run);
            assert_eq!(&engine.run(&config, &mut rng).unwrap(), outcome);
        }
    }

    #[test]
    fn test_zero_runs_rejected() {
        let topology = grid(2);
        let engine = CascadeEngine::new(&topology);
        let err = Ensemble::new(0, 1)
            .run(&engine, &CascadeConfig::default())
            .unwrap_err();
        assert!(matches!(err, CascadeError::InvalidParameter(_)));
    }

    #[test]
    fn test_summary_pads_short_curves() {
        let short = CascadeOutcome {
            seeds: vec![],
            failed: Default::default(),
            series: vec![
                DegradationSample { failed_percent: 0.0, llc_size: 4 },
                DegradationSample { failed_percent: 50.0, llc_size: 2 },
            ],
            rounds: 1,
            frontier_sizes: vec![2],
            truncated: false,
            bus_count: 4,
            final_llc: 2,
        };
        let long = CascadeOutcome {
            series: vec![
                DegradationSample { failed_percent: 0.0, llc_size: 4 },
                DegradationSample { failed_percent: 25.0, llc_size: 3 },
                DegradationSample { failed_percent: 100.0, llc_size: 0 },
            ],
            rounds: 2,
            frontier_sizes: vec![1, 3],
            final_llc: 0,
            ..short.clone()
        };
        let summary = EnsembleSummary::from_outcomes(SeedPolicy::HighDegree, &[short, long]);
        assert_eq!(summary.mean_curve.len(), 3);
        assert_eq!(summary.mean_curve[1].failed_percent, 37.5);
        assert_eq!(summary.mean_curve[2].failed_percent, 75.0);
        assert_eq!(summary.mean_curve[2].llc_size, 1.0);
        assert_eq!(summary.mean_rounds, 1.5);
        assert_eq!(summary.mean_final_llc, 1.0);
    }

    #[test]
    fn test_full_transmission_fails_connected_grid_for_every_policy() {
        let topology = grid(4);
        let config = CascadeConfig::new(1.0, 0.1, SeedPolicy::Random);
        let summaries =
            compare_policies(&topology, &config, &SeedPolicy::ALL, &Ensemble::new(4, 3)).unwrap();
        assert_eq!(summaries.len(), 3);
        for summary in summaries {
            assert_eq!(summary.mean_failed_percent, 100.0);
            assert_eq!(summary.min_failed_percent, 100.0);
            assert_eq!(summary.mean_final_llc, 0.0);
        }
    }
}
