//! Initial-failure (seed) selection.
//!
//! | Policy | Selection | Randomness |
//! |--------|-----------|------------|
//! | [`SeedPolicy::Random`] | uniform sample without replacement | injected RNG |
//! | [`SeedPolicy::HighDegree`] | top buses by neighbour count | none |
//! | [`SeedPolicy::HighBetweenness`] | top buses by betweenness centrality | none |
//!
//! Deterministic policies break ties by bus enumeration order. Betweenness is
//! `O(V·E)`, so [`SeedSelector`] computes it at most once per topology.

use std::fmt;
use std::str::FromStr;

use cascade_core::{BusId, CascadeError, CascadeResult, NodeIndex, Topology};
use once_cell::sync::OnceCell;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::centrality;

/// Seed-selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SeedPolicy {
    #[default]
    Random,
    HighDegree,
    HighBetweenness,
}

impl SeedPolicy {
    pub const ALL: [SeedPolicy; 3] = [
        SeedPolicy::Random,
        SeedPolicy::HighDegree,
        SeedPolicy::HighBetweenness,
    ];

    /// Canonical kebab-case name (accepted back by `FromStr`).
    pub fn name(&self) -> &'static str {
        match self {
            SeedPolicy::Random => "random",
            SeedPolicy::HighDegree => "high-degree",
            SeedPolicy::HighBetweenness => "high-betweenness",
        }
    }
}

impl fmt::Display for SeedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeedPolicy {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "random" => Ok(SeedPolicy::Random),
            "degree" | "high-degree" => Ok(SeedPolicy::HighDegree),
            "betweenness" | "high-betweenness" => Ok(SeedPolicy::HighBetweenness),
            _ => Err(CascadeError::UnsupportedPolicy(s.to_string())),
        }
    }
}

impl TryFrom<String> for SeedPolicy {
    type Error = CascadeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeedPolicy> for String {
    fn from(policy: SeedPolicy) -> Self {
        policy.name().to_string()
    }
}

/// Number of seeds for `node_count` buses: `max(1, round(N × fraction))`, never above `N`.
pub fn seed_count(node_count: usize, fraction: f64) -> CascadeResult<usize> {
    validate_fraction(fraction)?;
    if node_count == 0 {
        return Err(CascadeError::EmptyTopology);
    }
    let scaled = (node_count as f64 * fraction).round() as usize;
    Ok(scaled.clamp(1, node_count))
}

pub(crate) fn validate_fraction(fraction: f64) -> CascadeResult<()> {
    // written to reject NaN as well
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(CascadeError::InvalidParameter(format!(
            "seed fraction must lie in (0, 1], got {fraction}"
        )));
    }
    Ok(())
}

/// Picks seed buses from one topology, caching betweenness between calls.
///
/// The selector is `Sync`; parallel runs can share one instance and the first
/// betweenness-seeded run pays for the centrality computation.
pub struct SeedSelector<'a> {
    topology: &'a Topology,
    betweenness: OnceCell<Vec<f64>>,
}

impl<'a> SeedSelector<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        Self {
            topology,
            betweenness: OnceCell::new(),
        }
    }

    pub fn topology(&self) -> &'a Topology {
        self.topology
    }

    /// Betweenness scores indexed by `NodeIndex::index()`, computed on first use.
    pub fn betweenness(&self) -> &[f64] {
        self.betweenness.get_or_init(|| {
            tracing::debug!(
                buses = self.topology.bus_count(),
                "computing betweenness centrality"
            );
            centrality::betweenness(self.topology)
        })
    }

    /// Full ranking for a deterministic policy; `None` for [`SeedPolicy::Random`].
    pub fn ranking(&self, policy: SeedPolicy) -> Option<Vec<NodeIndex>> {
        match policy {
            SeedPolicy::Random => None,
            SeedPolicy::HighDegree => Some(centrality::degree_ranking(self.topology)),
            SeedPolicy::HighBetweenness => Some(centrality::rank_descending(self.betweenness())),
        }
    }

    /// Choose `seed_count(N, fraction)` distinct buses under `policy`.
    ///
    /// Seeds come back in rank order (deterministic policies) or draw order
    /// (random). Only the random policy consumes from `rng`.
    pub fn select<R: Rng>(
        &self,
        fraction: f64,
        policy: SeedPolicy,
        rng: &mut R,
    ) -> CascadeResult<Vec<BusId>> {
        let n = self.topology.bus_count();
        let count = seed_count(n, fraction)?;
        let chosen: Vec<NodeIndex> = match policy {
            SeedPolicy::Random => rand::seq::index::sample(rng, n, count)
                .into_iter()
                .map(NodeIndex::new)
                .collect(),
            SeedPolicy::HighDegree | SeedPolicy::HighBetweenness => self
                .ranking(policy)
                .unwrap_or_default()
                .into_iter()
                .take(count)
                .collect(),
        };
        Ok(chosen
            .into_iter()
            .map(|idx| self.topology.bus_id(idx))
            .collect())
    }
}

/// One-shot seed selection. Prefer [`SeedSelector`] when running many
/// betweenness-seeded simulations over the same topology.
pub fn select_seeds<R: Rng>(
    topology: &Topology,
    fraction: f64,
    policy: SeedPolicy,
    rng: &mut R,
) -> CascadeResult<Vec<BusId>> {
    SeedSelector::new(topology).select(fraction, policy, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn star() -> Topology {
        // hub 3 is listed third on purpose
        Topology::from_edges([1, 2, 3, 4, 5], [(3, 1), (3, 2), (3, 4), (3, 5)]).unwrap()
    }

    #[test]
    fn test_seed_count_rounding() {
        assert_eq!(seed_count(100, 0.05).unwrap(), 5);
        assert_eq!(seed_count(10, 0.25).unwrap(), 3); // 2.5 rounds away from zero
        assert_eq!(seed_count(10, 0.01).unwrap(), 1);
        assert_eq!(seed_count(7, 1.0).unwrap(), 7);
        assert_eq!(seed_count(1, 0.3).unwrap(), 1);
    }

    #[test]
    fn test_seed_count_rejects_bad_input() {
        assert!(matches!(
            seed_count(10, 0.0),
            Err(CascadeError::InvalidParameter(_))
        ));
        assert!(matches!(
            seed_count(10, 1.5),
            Err(CascadeError::InvalidParameter(_))
        ));
        assert!(matches!(
            seed_count(10, f64::NAN),
            Err(CascadeError::InvalidParameter(_))
        ));
        assert!(matches!(seed_count(0, 0.5), Err(CascadeError::EmptyTopology)));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("random".parse::<SeedPolicy>().unwrap(), SeedPolicy::Random);
        assert_eq!("Degree".parse::<SeedPolicy>().unwrap(), SeedPolicy::HighDegree);
        assert_eq!(
            "high_betweenness".parse::<SeedPolicy>().unwrap(),
            SeedPolicy::HighBetweenness
        );
        let err = "closeness".parse::<SeedPolicy>().unwrap_err();
        assert!(matches!(err, CascadeError::UnsupportedPolicy(ref name) if name == "closeness"));
    }

    #[test]
    fn test_policy_names_round_trip() {
        for policy in SeedPolicy::ALL {
            assert_eq!(policy.to_string().parse::<SeedPolicy>().unwrap(), policy);
        }
        assert_eq!(SeedPolicy::default(), SeedPolicy::Random);
    }

    #[test]
    fn test_policy_serde_rejects_unknown_names() {
        let policy: SeedPolicy = serde_json::from_str("\"high-degree\"").unwrap();
        assert_eq!(policy, SeedPolicy::HighDegree);
        assert!(serde_json::from_str::<SeedPolicy>("\"eigenvector\"").is_err());
    }

    #[test]
    fn test_high_degree_picks_hub() {
        let topology = star();
        let mut rng = StdRng::seed_from_u64(0);
        let seeds = select_seeds(&topology, 0.2, SeedPolicy::HighDegree, &mut rng).unwrap();
        assert_eq!(seeds, vec![BusId::new(3)]);
    }

    #[test]
    fn test_high_degree_tie_break_is_enumeration_order() {
        let topology = star();
        let mut rng = StdRng::seed_from_u64(0);
        let seeds = select_seeds(&topology, 0.6, SeedPolicy::HighDegree, &mut rng).unwrap();
        assert_eq!(seeds, vec![BusId::new(3), BusId::new(1), BusId::new(2)]);
    }

    #[test]
    fn test_high_betweenness_picks_bridge() {
        // two triangles joined through bus 7
        let topology = Topology::from_edges(
            1..=7,
            [(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 4), (3, 7), (7, 4)],
        )
        .unwrap();
        let selector = SeedSelector::new(&topology);
        let mut rng = StdRng::seed_from_u64(0);
        let seeds = selector
            .select(0.1, SeedPolicy::HighBetweenness, &mut rng)
            .unwrap();
        assert_eq!(seeds, vec![BusId::new(7)]);
    }

    #[test]
    fn test_betweenness_is_cached() {
        let topology = star();
        let selector = SeedSelector::new(&topology);
        let first = selector.betweenness().as_ptr();
        let second = selector.betweenness().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_seeds_are_distinct_and_reproducible() {
        let topology = Topology::from_edges(0..50, []).unwrap();
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let first = select_seeds(&topology, 0.2, SeedPolicy::Random, &mut a).unwrap();
        let second = select_seeds(&topology, 0.2, SeedPolicy::Random, &mut b).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        let unique: HashSet<_> = first.iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_full_fraction_selects_everything() {
        let topology = star();
        let mut rng = StdRng::seed_from_u64(3);
        for policy in SeedPolicy::ALL {
            let mut seeds = select_seeds(&topology, 1.0, policy, &mut rng).unwrap();
            seeds.sort();
            assert_eq!(seeds, topology.bus_ids().collect::<Vec<_>>(), "{policy}");
        }
    }
}
