//! # cascade-io: Topology loading and result export
//!
//! The cascade engine works on an in-memory [`cascade_core::Topology`]. This crate
//! builds one from the bus/branch tables grid datasets ship as CSV, and writes run
//! results back out as plain CSV or JSON for plotting and reporting tools.

pub mod exporters;
pub mod importers;

pub use exporters::{write_curves_csv, write_outcome_json, write_series_csv, write_summaries_csv};
pub use importers::{load_topology, read_topology};
