//! Bus/branch table importer.
//!
//! **Expected CSV format:**
//! - bus table: `Bus ID` (required), `Bus Name` (optional), any further columns ignored
//! - branch table: `From Bus`, `To Bus` (required), any further columns ignored
//!
//! Headers are matched exactly after trimming surrounding whitespace, so exports
//! such as `Bus ID, Bus Name, MW Load` load unchanged.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use cascade_core::{BusId, Topology};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct BusRecord {
    #[serde(rename = "Bus ID")]
    bus_id: usize,
    #[serde(rename = "Bus Name", default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchRecord {
    #[serde(rename = "From Bus")]
    from_bus: usize,
    #[serde(rename = "To Bus")]
    to_bus: usize,
}

/// Load a topology from bus and branch CSV files.
pub fn load_topology(bus_csv: &Path, branch_csv: &Path) -> Result<Topology> {
    let buses = File::open(bus_csv)
        .with_context(|| format!("opening bus table '{}'", bus_csv.display()))?;
    let branches = File::open(branch_csv)
        .with_context(|| format!("opening branch table '{}'", branch_csv.display()))?;
    let topology = read_topology(buses, branches).with_context(|| {
        format!(
            "building topology from '{}' and '{}'",
            bus_csv.display(),
            branch_csv.display()
        )
    })?;
    info!(
        buses = topology.bus_count(),
        branches = topology.branch_count(),
        "loaded topology"
    );
    Ok(topology)
}

/// Build a topology from in-memory bus and branch tables.
pub fn read_topology<B: Read, E: Read>(buses: B, branches: E) -> Result<Topology> {
    let mut topology = Topology::new();

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(buses);
    for (row, result) in rdr.deserialize().enumerate() {
        let record: BusRecord =
            result.with_context(|| format!("parsing bus record {}", row + 1))?;
        let name = record
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Bus {}", record.bus_id));
        topology
            .add_bus(BusId::new(record.bus_id), name)
            .with_context(|| format!("bus record {}", row + 1))?;
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(branches);
    let mut skipped = 0usize;
    for (row, result) in rdr.deserialize().enumerate() {
        let record: BranchRecord =
            result.with_context(|| format!("parsing branch record {}", row + 1))?;
        let added = topology
            .add_branch(BusId::new(record.from_bus), BusId::new(record.to_bus))
            .with_context(|| {
                format!(
                    "branch record {} ({} -> {})",
                    row + 1,
                    record.from_bus,
                    record.to_bus
                )
            })?;
        if !added {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!(
            skipped,
            "ignored parallel branches and self-loops while building topology"
        );
    }

    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUSES: &str = "Bus ID,Bus Name,MW Load\n1,ALPHA,10.5\n2,BRAVO,0\n3,,4\n";
    const BRANCHES: &str = "From Bus,To Bus,Circuit\n1,2,1\n2,3,1\n2,3,2\n";

    #[test]
    fn test_read_topology() {
        let topology = read_topology(BUSES.as_bytes(), BRANCHES.as_bytes()).unwrap();
        assert_eq!(topology.bus_count(), 3);
        // the second 2-3 circuit is collapsed
        assert_eq!(topology.branch_count(), 2);
        assert_eq!(topology.bus(BusId::new(1)).unwrap().name, "ALPHA");
        assert_eq!(topology.bus(BusId::new(3)).unwrap().name, "Bus 3");
    }

    #[test]
    fn test_whitespace_in_headers_is_trimmed() {
        let buses = "Bus ID , Bus Name\n 7 , X\n 8 , Y\n";
        let branches = " From Bus , To Bus \n7,8\n";
        let topology = read_topology(buses.as_bytes(), branches.as_bytes()).unwrap();
        assert_eq!(topology.degree(BusId::new(7)), Some(1));
    }

    #[test]
    fn test_unknown_branch_endpoint_is_reported() {
        let branches = "From Bus,To Bus\n1,2\n2,42\n";
        let err = read_topology(BUSES.as_bytes(), branches.as_bytes()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("branch record 2"), "{message}");
        assert!(message.contains("42"), "{message}");
    }

    #[test]
    fn test_missing_column_is_reported() {
        let buses = "Name\nALPHA\n";
        let err = read_topology(buses.as_bytes(), BRANCHES.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing bus record 1"));
    }

    #[test]
    fn test_duplicate_bus_is_reported() {
        let buses = "Bus ID\n1\n1\n";
        let err = read_topology(buses.as_bytes(), "From Bus,To Bus\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate bus id 1"));
    }
}
