//! Largest live component (LLC): the biggest connected group of still-functional buses.
//!
//! Recomputed from scratch on every call with a union-find pass over the branch
//! list, `O(E α(V))`. Branches with a failed endpoint are ignored.

use cascade_core::{StatusLayer, Topology};
use petgraph::unionfind::UnionFind;

/// Size of the largest connected component induced by functional buses, or 0 when none remain.
pub fn largest_live_component(topology: &Topology, status: &StatusLayer) -> usize {
    live_components(topology, status)
        .first()
        .copied()
        .unwrap_or(0)
}

/// Sizes of every live component, largest first.
pub fn live_components(topology: &Topology, status: &StatusLayer) -> Vec<usize> {
    debug_assert_eq!(status.len(), topology.bus_count());
    let n = topology.bus_count();
    let mut sets = UnionFind::<usize>::new(n);
    for (a, b) in topology.edge_endpoints() {
        if status.is_functional(a) && status.is_functional(b) {
            sets.union(a.index(), b.index());
        }
    }

    let mut members = vec![0usize; n];
    for idx in topology.node_indices() {
        if status.is_functional(idx) {
            members[sets.find(idx.index())] += 1;
        }
    }
    let mut sizes: Vec<usize> = members.into_iter().filter(|&size| size > 0).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}
