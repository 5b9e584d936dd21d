//! # cascade-algo: Cascading Failure Simulation
//!
//! Independent-cascade failure propagation over a grid topology, with the structural
//! metric used to measure how much of the network still holds together.
//!
//! ## Components
//!
//! | Component | Entry point | Notes |
//! |-----------|-------------|-------|
//! | Seed selection | [`SeedSelector`], [`select_seeds`] | random, high-degree, high-betweenness |
//! | Centrality | [`centrality::betweenness`] | Brandes, normalised |
//! | Propagation | [`CascadeEngine`], [`run_cascade`] | synchronous rounds, per-edge trials |
//! | Structural metric | [`largest_live_component`] | union-find over functional buses |
//! | Ensembles | [`Ensemble`], [`compare_policies`] | parallel with the `parallel` feature |
//!
//! ## Example
//!
//! ```
//! use cascade_algo::{CascadeConfig, CascadeEngine, SeedPolicy};
//! use cascade_core::Topology;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let star = Topology::from_edges(0..5, [(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
//! let engine = CascadeEngine::new(&star);
//! let config = CascadeConfig::new(1.0, 0.2, SeedPolicy::HighDegree);
//!
//! let outcome = engine.run(&config, &mut StdRng::seed_from_u64(1)).unwrap();
//! assert_eq!(outcome.series.first().unwrap().llc_size, 5);
//! assert_eq!(outcome.final_failed_percent(), 100.0);
//! ```

pub mod cascade;
pub mod centrality;
pub mod ensemble;
pub mod llc;
pub mod seed;

pub use cascade::{run_cascade, CascadeConfig, CascadeEngine, CascadeOutcome, DegradationSample};
pub use ensemble::{compare_policies, CurvePoint, Ensemble, EnsembleSummary};
pub use llc::{largest_live_component, live_components};
pub use seed::{seed_count, select_seeds, SeedPolicy, SeedSelector};
