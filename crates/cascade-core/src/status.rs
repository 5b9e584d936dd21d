//! Per-run bus status, kept apart from the shared topology.
//!
//! A [`StatusLayer`] is a dense table indexed by [`NodeIndex`]. Creating one is the
//! logical "copy" of the network a run works on: the adjacency structure stays
//! shared and immutable, only this table is private to the run.

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::Topology;

/// Two-state bus status. `Failed` is terminal within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Functional,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLayer {
    states: Vec<NodeStatus>,
    failed: usize,
}

impl StatusLayer {
    /// Fresh layer with every bus of `topology` functional.
    pub fn functional(topology: &Topology) -> Self {
        Self {
            states: vec![NodeStatus::Functional; topology.bus_count()],
            failed: 0,
        }
    }

    /// Mark a bus failed. Returns `true` only on the Functional → Failed
    /// transition, so repeated calls are no-ops.
    pub fn fail(&mut self, idx: NodeIndex) -> bool {
        let slot = &mut self.states[idx.index()];
        if *slot == NodeStatus::Failed {
            return false;
        }
        *slot = NodeStatus::Failed;
        self.failed += 1;
        true
    }

    pub fn status(&self, idx: NodeIndex) -> NodeStatus {
        self.states[idx.index()]
    }

    #[inline]
    pub fn is_functional(&self, idx: NodeIndex) -> bool {
        self.states[idx.index()] == NodeStatus::Functional
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn functional_count(&self) -> usize {
        self.states.len() - self.failed
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Failed share of all buses, in percent.
    pub fn failed_percent(&self) -> f64 {
        if self.states.is_empty() {
            return 0.0;
        }
        100.0 * self.failed as f64 / self.states.len() as f64
    }

    /// Indices of every failed bus, in enumeration order.
    pub fn failed_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == NodeStatus::Failed)
            .map(|(i, _)| NodeIndex::new(i))
    }
}
