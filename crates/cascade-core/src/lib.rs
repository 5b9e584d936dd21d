//! # cascade-core: Grid Topology Model for Cascade Simulation
//!
//! Provides the shared, read-only network topology that cascade simulations run over,
//! and the per-run status layer that records which buses have failed.
//!
//! ## Design Philosophy
//!
//! Networks are modeled as **simple undirected graphs** where:
//! - **Nodes**: Buses, identified by an opaque [`BusId`]
//! - **Edges**: Branches (lines and transformers alike, no electrical parameters)
//!
//! The topology is built once and never mutated by a simulation. Each run pairs it
//! with its own [`StatusLayer`], a dense `Vec` indexed by petgraph [`NodeIndex`],
//! so repeated or concurrent runs never share state and never copy adjacency lists.
//!
//! ## Quick Start
//!
//! ```rust
//! use cascade_core::*;
//!
//! let mut topology = Topology::new();
//! topology.add_bus(BusId::new(1), "North").unwrap();
//! topology.add_bus(BusId::new(2), "South").unwrap();
//! topology.add_branch(BusId::new(1), BusId::new(2)).unwrap();
//!
//! let mut status = StatusLayer::functional(&topology);
//! let north = topology.index_of(BusId::new(1)).unwrap();
//! assert!(status.fail(north));
//! assert_eq!(status.failed_count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Unified error type
//! - [`graph_utils`] - Topological statistics (components, degrees, density)
//! - [`status`] - Per-run Functional/Failed status layer

use std::collections::HashMap;

use petgraph::prelude::*;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod graph_utils;
pub mod status;

pub use error::{CascadeError, CascadeResult};
pub use graph_utils::*;
pub use petgraph::graph::NodeIndex;
pub use status::{NodeStatus, StatusLayer};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);

impl BusId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
}

/// Immutable bus/branch topology shared by every simulation run.
///
/// Parallel branches and self-loops carry no extra meaning for connectivity or
/// for failure transmission, so [`Topology::add_branch`] keeps at most one edge
/// per bus pair and drops self-loops. Branches carry no weight.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    graph: UnGraph<Bus, ()>,
    index: HashMap<BusId, NodeIndex>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology from bus ids and `(from, to)` pairs in one call.
    ///
    /// ```
    /// use cascade_core::{BusId, Topology};
    ///
    /// let ring = Topology::from_edges(1..=3, [(1, 2), (2, 3), (3, 1)]).unwrap();
    /// assert_eq!(ring.bus_count(), 3);
    /// assert_eq!(ring.degree(BusId::new(2)), Some(2));
    /// ```
    pub fn from_edges<I, E>(buses: I, branches: E) -> CascadeResult<Self>
    where
        I: IntoIterator<Item = usize>,
        E: IntoIterator<Item = (usize, usize)>,
    {
        let mut topology = Self::new();
        for id in buses {
            topology.add_bus(BusId::new(id), format!("Bus {id}"))?;
        }
        for (from, to) in branches {
            topology.add_branch(BusId::new(from), BusId::new(to))?;
        }
        Ok(topology)
    }

    /// Add a bus. Bus ids are unique within a topology.
    pub fn add_bus(&mut self, id: BusId, name: impl Into<String>) -> CascadeResult<NodeIndex> {
        if self.index.contains_key(&id) {
            return Err(CascadeError::Validation(format!("duplicate bus id {id}")));
        }
        let idx = self.graph.add_node(Bus {
            id,
            name: name.into(),
        });
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Connect two existing buses.
    ///
    /// Returns `Ok(false)` when the branch is a self-loop or duplicates an existing
    /// connection, and an error when either endpoint is not a known bus.
    pub fn add_branch(&mut self, from: BusId, to: BusId) -> CascadeResult<bool> {
        let a = self.require(from)?;
        let b = self.require(to)?;
        if a == b || self.graph.find_edge(a, b).is_some() {
            return Ok(false);
        }
        self.graph.add_edge(a, b, ());
        Ok(true)
    }

    fn require(&self, id: BusId) -> CascadeResult<NodeIndex> {
        self.index_of(id).ok_or_else(|| {
            CascadeError::Validation(format!("branch endpoint {id} is not a known bus"))
        })
    }

    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn branch_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: BusId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn index_of(&self, id: BusId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    /// Bus id stored at a node index. Panics on an index from another topology.
    pub fn bus_id(&self, idx: NodeIndex) -> BusId {
        self.graph[idx].id
    }

    pub fn bus(&self, id: BusId) -> Option<&Bus> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    /// Node indices in enumeration (insertion) order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Bus ids in enumeration (insertion) order.
    pub fn bus_ids(&self) -> impl Iterator<Item = BusId> + '_ {
        self.graph.node_weights().map(|bus| bus.id)
    }

    /// Neighbors of a node, in a fixed order determined by construction.
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// Neighbor ids of a bus, or `None` if the bus is unknown.
    pub fn neighbor_ids(&self, id: BusId) -> Option<Vec<BusId>> {
        let idx = self.index_of(id)?;
        Some(self.graph.neighbors(idx).map(|n| self.graph[n].id).collect())
    }

    pub fn degree(&self, id: BusId) -> Option<usize> {
        self.index_of(id).map(|idx| self.degree_at(idx))
    }

    pub fn degree_at(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors(idx).count()
    }

    /// Endpoint node indices of every branch.
    pub fn edge_endpoints(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target()))
    }

    /// Read access to the underlying petgraph graph for algorithms.
    pub fn graph(&self) -> &UnGraph<Bus, ()> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_creation() {
        let mut topology = Topology::new();
        topology.add_bus(BusId::new(10), "Bus 10").unwrap();
        topology.add_bus(BusId::new(20), "Bus 20").unwrap();
        assert!(topology.add_branch(BusId::new(10), BusId::new(20)).unwrap());

        assert_eq!(topology.bus_count(), 2);
        assert_eq!(topology.branch_count(), 1);
        assert!(topology.contains(BusId::new(10)));
        assert!(!topology.contains(BusId::new(30)));
        assert_eq!(topology.bus(BusId::new(20)).unwrap().name, "Bus 20");
    }

    #[test]
    fn test_duplicate_bus_rejected() {
        let mut topology = Topology::new();
        topology.add_bus(BusId::new(1), "a").unwrap();
        let err = topology.add_bus(BusId::new(1), "b").unwrap_err();
        assert!(matches!(err, CascadeError::Validation(_)));
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let mut topology = Topology::from_edges([1, 2], []).unwrap();
        let err = topology
            .add_branch(BusId::new(1), BusId::new(99))
            .unwrap_err();
        assert!(err.to_string().contains("99"));
        assert_eq!(topology.branch_count(), 0);
    }

    #[test]
    fn test_parallel_branches_and_self_loops_ignored() {
        let mut topology = Topology::from_edges([1, 2], [(1, 2)]).unwrap();
        assert!(!topology.add_branch(BusId::new(2), BusId::new(1)).unwrap());
        assert!(!topology.add_branch(BusId::new(1), BusId::new(1)).unwrap());
        assert_eq!(topology.branch_count(), 1);
        assert_eq!(topology.degree(BusId::new(1)), Some(1));
    }

    #[test]
    fn test_neighbor_lookup() {
        let star = Topology::from_edges(0..5, [(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        let mut leaves = star.neighbor_ids(BusId::new(0)).unwrap();
        leaves.sort();
        assert_eq!(
            leaves,
            vec![BusId::new(1), BusId::new(2), BusId::new(3), BusId::new(4)]
        );
        assert_eq!(star.neighbor_ids(BusId::new(3)).unwrap(), vec![BusId::new(0)]);
        assert!(star.neighbor_ids(BusId::new(9)).is_none());
    }

    #[test]
    fn test_enumeration_order_is_insertion_order() {
        let topology = Topology::from_edges([5, 3, 9], []).unwrap();
        let ids: Vec<usize> = topology.bus_ids().map(|id| id.value()).collect();
        assert_eq!(ids, vec![5, 3, 9]);
    }

    #[test]
    fn test_bus_id_serializes_transparently() {
        let json = serde_json::to_string(&BusId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
