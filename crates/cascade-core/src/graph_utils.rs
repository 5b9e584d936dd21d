use crate::Topology;
use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

/// Summary statistics produced by `cascade stats` (density/degree/connected components).
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub largest_component: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// Calculates graph-level statistics such as density, degree distribution, and component counts (classic network science measures).
pub fn topology_stats(topology: &Topology) -> TopologyStats {
    let node_count = topology.bus_count();
    let edge_count = topology.branch_count();
    let degrees: Vec<usize> = topology
        .node_indices()
        .map(|node| topology.degree_at(node))
        .collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    let largest_component = component_sizes(topology).first().copied().unwrap_or(0);
    TopologyStats {
        node_count,
        edge_count,
        connected_components: connected_components(topology.graph()),
        largest_component,
        min_degree,
        avg_degree,
        max_degree,
        density,
    }
}

/// Sizes of every connected component (breadth-first search), largest first.
pub fn component_sizes(topology: &Topology) -> Vec<usize> {
    let mut visited: HashSet<NodeIndex> = HashSet::with_capacity(topology.bus_count());
    let mut sizes = Vec::new();
    for start in topology.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut members = 0;
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members += 1;
            for neighbor in topology.neighbors(node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        sizes.push(members);
    }
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}
