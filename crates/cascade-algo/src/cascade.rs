//! Round-based independent-cascade failure propagation.
//!
//! ## Algorithm
//!
//! 1. Record the intact network as sample 0: `(0.0, LLC)`.
//! 2. Mark the seeds failed; they form the first frontier.
//! 3. While the frontier is non-empty:
//!    a. record `(100 × failed / N, LLC)` for the state *before* this round's transmissions,
//!    b. every frontier bus makes one transmission attempt on each neighbour that is
//!       still functional; an attempt succeeds when a uniform draw in `[0, 1)` is `≤ alpha`,
//!    c. buses failed in this round become the next frontier.
//!
//! Failures are monotone, so a run ends after at most `N` rounds. Draws are consumed
//! in a fixed order (frontier in failure order, neighbours in adjacency order), which
//! makes a run reproducible from the RNG state alone.
//!
//! A bus reached by several failed neighbours in one round is tested once per
//! neighbour until one attempt succeeds; after that it is no longer functional and
//! is skipped, so it enters the next frontier exactly once.

use std::collections::BTreeSet;

use cascade_core::{BusId, CascadeError, CascadeResult, NodeIndex, StatusLayer, Topology};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llc::largest_live_component;
use crate::seed::{validate_fraction, SeedPolicy, SeedSelector};

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Per-attempt transmission probability, in `[0, 1]`
    pub alpha: f64,
    /// Share of buses failed before round 1, in `(0, 1]`
    pub seed_fraction: f64,
    #[serde(default)]
    pub policy: SeedPolicy,
    /// Optional cap on propagation rounds
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            seed_fraction: 0.05,
            policy: SeedPolicy::Random,
            max_rounds: None,
        }
    }
}

impl CascadeConfig {
    pub fn new(alpha: f64, seed_fraction: f64, policy: SeedPolicy) -> Self {
        Self {
            alpha,
            seed_fraction,
            policy,
            max_rounds: None,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_policy(mut self, policy: SeedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validate(&self) -> CascadeResult<()> {
        validate_alpha(self.alpha)?;
        validate_fraction(self.seed_fraction)?;
        validate_max_rounds(self.max_rounds)
    }
}

fn validate_alpha(alpha: f64) -> CascadeResult<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(CascadeError::InvalidParameter(format!(
            "alpha must lie in [0, 1], got {alpha}"
        )));
    }
    Ok(())
}

fn validate_max_rounds(max_rounds: Option<usize>) -> CascadeResult<()> {
    if max_rounds == Some(0) {
        return Err(CascadeError::InvalidParameter(
            "max_rounds must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// One point of the degradation curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradationSample {
    /// Failed buses as a percentage of all buses
    pub failed_percent: f64,
    /// Largest live component size
    pub llc_size: usize,
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    /// Seeds in selection order
    pub seeds: Vec<BusId>,
    /// Every bus failed by the end of the run (seeds included)
    pub failed: BTreeSet<BusId>,
    /// Chronological samples, intact network first
    pub series: Vec<DegradationSample>,
    /// Propagation rounds executed
    pub rounds: usize,
    /// Buses transmitting in each executed round; entry 0 is the seed set
    pub frontier_sizes: Vec<usize>,
    /// True when `max_rounds` stopped the run with failures still spreading
    pub truncated: bool,
    pub bus_count: usize,
    /// LLC after the last executed round
    pub final_llc: usize,
}

impl CascadeOutcome {
    pub fn final_failed_percent(&self) -> f64 {
        if self.bus_count == 0 {
            return 0.0;
        }
        100.0 * self.failed.len() as f64 / self.bus_count as f64
    }
}

/// Cascade simulator bound to one immutable topology.
///
/// Every run allocates its own [`StatusLayer`], so an engine can serve any number
/// of sequential or parallel runs.
pub struct CascadeEngine<'a> {
    topology: &'a Topology,
    selector: SeedSelector<'a>,
}

impl<'a> CascadeEngine<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        Self {
            topology,
            selector: SeedSelector::new(topology),
        }
    }

    pub fn topology(&self) -> &'a Topology {
        self.topology
    }

    pub fn selector(&self) -> &SeedSelector<'a> {
        &self.selector
    }

    /// Select seeds under `config.policy` and propagate.
    pub fn run<R: Rng>(&self, config: &CascadeConfig, rng: &mut R) -> CascadeResult<CascadeOutcome> {
        config.validate()?;
        if self.topology.is_empty() {
            return Err(CascadeError::EmptyTopology);
        }
        let seeds = self
            .selector
            .select(config.seed_fraction, config.policy, rng)?;
        self.propagate(config.alpha, seeds, config.max_rounds, rng)
    }

    /// Propagate from an explicit seed set. Duplicate ids are collapsed.
    pub fn run_with_seeds<R: Rng>(
        &self,
        alpha: f64,
        seeds: &[BusId],
        max_rounds: Option<usize>,
        rng: &mut R,
    ) -> CascadeResult<CascadeOutcome> {
        validate_alpha(alpha)?;
        validate_max_rounds(max_rounds)?;
        if self.topology.is_empty() {
            return Err(CascadeError::EmptyTopology);
        }
        if seeds.is_empty() {
            return Err(CascadeError::InvalidParameter(
                "at least one seed bus is required".to_string(),
            ));
        }
        let mut unique = BTreeSet::new();
        let mut ordered = Vec::with_capacity(seeds.len());
        for &id in seeds {
            if !self.topology.contains(id) {
                return Err(CascadeError::InvalidParameter(format!(
                    "seed bus {id} is not part of the topology"
                )));
            }
            if unique.insert(id) {
                ordered.push(id);
            }
        }
        self.propagate(alpha, ordered, max_rounds, rng)
    }

    fn propagate<R: Rng>(
        &self,
        alpha: f64,
        seeds: Vec<BusId>,
        max_rounds: Option<usize>,
        rng: &mut R,
    ) -> CascadeResult<CascadeOutcome> {
        let topology = self.topology;
        let mut status = StatusLayer::functional(topology);
        let mut series = vec![DegradationSample {
            failed_percent: 0.0,
            llc_size: largest_live_component(topology, &status),
        }];

        let mut frontier: Vec<NodeIndex> = Vec::with_capacity(seeds.len());
        for &id in &seeds {
            let idx = topology.index_of(id).ok_or_else(|| {
                CascadeError::InvalidParameter(format!("seed bus {id} is not part of the topology"))
            })?;
            if status.fail(idx) {
                frontier.push(idx);
            }
        }

        let mut rounds = 0;
        let mut frontier_sizes = Vec::new();
        let mut truncated = false;
        while !frontier.is_empty() {
            if max_rounds.is_some_and(|cap| rounds >= cap) {
                truncated = true;
                break;
            }
            let sample = DegradationSample {
                failed_percent: status.failed_percent(),
                llc_size: largest_live_component(topology, &status),
            };
            series.push(sample);
            frontier_sizes.push(frontier.len());

            let mut next = Vec::new();
            for &node in &frontier {
                for neighbor in topology.neighbors(node) {
                    if !status.is_functional(neighbor) {
                        continue;
                    }
                    if transmits(rng, alpha) && status.fail(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            rounds += 1;
            debug!(
                round = rounds,
                frontier = frontier.len(),
                newly_failed = next.len(),
                failed_before = sample.failed_percent,
                llc_before = sample.llc_size,
                "cascade round"
            );
            frontier = next;
        }

        let final_llc = largest_live_component(topology, &status);
        let failed: BTreeSet<BusId> = status
            .failed_indices()
            .map(|idx| topology.bus_id(idx))
            .collect();
        debug!(
            seeds = seeds.len(),
            failed = failed.len(),
            rounds,
            truncated,
            final_llc,
            "cascade finished"
        );

        Ok(CascadeOutcome {
            seeds,
            failed,
            series,
            rounds,
            frontier_sizes,
            truncated,
            bus_count: topology.bus_count(),
            final_llc,
        })
    }
}

/// One transmission attempt. Always consumes exactly one draw so the random
/// stream does not depend on alpha.
#[inline]
fn transmits<R: Rng>(rng: &mut R, alpha: f64) -> bool {
    let draw: f64 = rng.gen();
    alpha > 0.0 && draw <= alpha
}

/// Run one simulation: select seeds under `policy`, then propagate with probability `alpha`.
///
/// ```
/// use cascade_algo::{run_cascade, SeedPolicy};
/// use cascade_core::Topology;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let ring = Topology::from_edges(1..=5, [(1, 2), (2, 3), (3, 4), (4, 5), (5, 1)]).unwrap();
/// let mut rng = StdRng::seed_from_u64(7);
/// let outcome = run_cascade(&ring, 1.0, 0.2, SeedPolicy::Random, &mut rng).unwrap();
/// assert_eq!(outcome.failed.len(), 5);
/// assert_eq!(outcome.final_llc, 0);
/// ```
pub fn run_cascade<R: Rng>(
    topology: &Topology,
    alpha: f64,
    fraction: f64,
    policy: SeedPolicy,
    rng: &mut R,
) -> CascadeResult<CascadeOutcome> {
    CascadeEngine::new(topology).run(&CascadeConfig::new(alpha, fraction, policy), rng)
}
