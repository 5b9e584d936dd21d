//! Node rankings used by the deterministic seeding policies.
//!
//! Betweenness follows Brandes (2001), "A faster algorithm for betweenness
//! centrality", J. Math. Sociol. 25(2): one BFS per source on the unweighted
//! graph followed by dependency accumulation in reverse BFS order, `O(V·E)` time
//! and `O(V + E)` memory. Scores are normalised by `1 / ((n-1)(n-2))`, so a
//! star's hub scores exactly 1.0.

use std::cmp::Reverse;
use std::collections::VecDeque;

use cascade_core::{NodeIndex, Topology};

/// Exact betweenness centrality for every bus, indexed by `NodeIndex::index()`.
pub fn betweenness(topology: &Topology) -> Vec<f64> {
    let n = topology.bus_count();
    let mut centrality = vec![0.0; n];

    let mut stack: Vec<NodeIndex> = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut distance: Vec<Option<usize>> = vec![None; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::with_capacity(n);

    for source in topology.node_indices() {
        stack.clear();
        for preds in predecessors.iter_mut() {
            preds.clear();
        }
        sigma.fill(0.0);
        distance.fill(None);
        delta.fill(0.0);

        sigma[source.index()] = 1.0;
        distance[source.index()] = Some(0);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let next = distance[v.index()].map_or(0, |d| d + 1);
            for w in topology.neighbors(v) {
                if distance[w.index()].is_none() {
                    distance[w.index()] = Some(next);
                    queue.push_back(w);
                }
                if distance[w.index()] == Some(next) {
                    sigma[w.index()] += sigma[v.index()];
                    predecessors[w.index()].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            let coefficient = (1.0 + delta[w.index()]) / sigma[w.index()];
            for &v in &predecessors[w.index()] {
                delta[v.index()] += sigma[v.index()] * coefficient;
            }
            if w != source {
                centrality[w.index()] += delta[w.index()];
            }
        }
    }

    // Every unordered pair was counted from both ends; the normalisation
    // factor below already accounts for that.
    if n > 2 {
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for value in centrality.iter_mut() {
            *value *= scale;
        }
    }
    centrality
}

/// Node indices ordered by descending score. Equal scores keep enumeration order.
///
/// Scores are compared at a resolution of `1e-9`: betweenness sums the same
/// path fractions in different orders for different nodes, so symmetric nodes
/// can differ in the last bits and must still count as tied.
pub fn rank_descending(scores: &[f64]) -> Vec<NodeIndex> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by_key is stable
    order.sort_by_key(|&idx| Reverse(quantize(scores[idx])));
    order.into_iter().map(NodeIndex::new).collect()
}

fn quantize(score: f64) -> i64 {
    (score * SCORE_RESOLUTION).round() as i64
}

const SCORE_RESOLUTION: f64 = 1e9;

/// Node indices ordered by descending degree, ties in enumeration order.
pub fn degree_ranking(topology: &Topology) -> Vec<NodeIndex> {
    let mut order: Vec<NodeIndex> = topology.node_indices().collect();
    // sort_by_key is stable
    order.sort_by_key(|&idx| Reverse(topology.degree_at(idx)));
    order
}
