//! Plain-data exports of simulation results.
//!
//! Degradation series are written one row per sample. Each sample reflects the
//! network state at the start of its round, before that round's transmissions;
//! row 0 is the intact network.

use std::io::Write;

use anyhow::{Context, Result};
use cascade_algo::{CascadeOutcome, EnsembleSummary};
use serde::Serialize;

#[derive(Serialize)]
struct SeriesRow {
    round: usize,
    failed_percent: f64,
    llc_size: usize,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    policy: &'a str,
    runs: usize,
    mean_failed_percent: f64,
    min_failed_percent: f64,
    max_failed_percent: f64,
    mean_rounds: f64,
    mean_final_llc: f64,
}

#[derive(Serialize)]
struct CurveRow<'a> {
    policy: &'a str,
    step: usize,
    failed_percent: f64,
    llc_size: f64,
}

/// Write `round,failed_percent,llc_size` rows for one run.
pub fn write_series_csv<W: Write>(outcome: &CascadeOutcome, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (round, sample) in outcome.series.iter().enumerate() {
        wtr.serialize(SeriesRow {
            round,
            failed_percent: sample.failed_percent,
            llc_size: sample.llc_size,
        })
        .context("writing series row")?;
    }
    wtr.flush().context("flushing series CSV")?;
    Ok(())
}

/// Write the whole outcome (seeds, failed set, series, counters) as pretty JSON.
pub fn write_outcome_json<W: Write>(outcome: &CascadeOutcome, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, outcome).context("serializing outcome")?;
    writeln!(writer)?;
    Ok(())
}

/// One row per ensemble with its aggregate statistics.
pub fn write_summaries_csv<W: Write>(summaries: &[EnsembleSummary], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in summaries {
        wtr.serialize(SummaryRow {
            policy: summary.policy.name(),
            runs: summary.runs,
            mean_failed_percent: summary.mean_failed_percent,
            min_failed_percent: summary.min_failed_percent,
            max_failed_percent: summary.max_failed_percent,
            mean_rounds: summary.mean_rounds,
            mean_final_llc: summary.mean_final_llc,
        })
        .context("writing summary row")?;
    }
    wtr.flush().context("flushing summary CSV")?;
    Ok(())
}

/// Long-format mean degradation curves, one row per (policy, step).
pub fn write_curves_csv<W: Write>(summaries: &[EnsembleSummary], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in summaries {
        for (step, point) in summary.mean_curve.iter().enumerate() {
            wtr.serialize(CurveRow {
                policy: summary.policy.name(),
                step,
                failed_percent: point.failed_percent,
                llc_size: point.llc_size,
            })
            .context("writing curve row")?;
        }
    }
    wtr.flush().context("flushing curve CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_algo::CascadeEngine;
    use cascade_core::{BusId, Topology};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn star_outcome() -> CascadeOutcome {
        let star = Topology::from_edges(0..5, [(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        CascadeEngine::new(&star)
            .run_with_seeds(1.0, &[BusId::new(0)], None, &mut StdRng::seed_from_u64(1))
            .unwrap()
    }

    #[test]
    fn test_series_csv() {
        let mut buffer = Vec::new();
        write_series_csv(&star_outcome(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "round,failed_percent,llc_size\n0,0.0,5\n1,20.0,1\n2,100.0,0\n"
        );
    }

    #[test]
    fn test_outcome_json() {
        let mut buffer = Vec::new();
        write_outcome_json(&star_outcome(), &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["seeds"], serde_json::json!([0]));
        assert_eq!(value["failed"], serde_json::json!([0, 1, 2, 3, 4]));
        assert_eq!(value["final_llc"], 0);
        assert_eq!(value["series"][0]["llc_size"], 5);
    }
}
