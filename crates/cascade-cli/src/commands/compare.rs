use std::fs::File;
use std::io::{self, Write};

use anyhow::{Context, Result};
use cascade_algo::{compare_policies, Ensemble, EnsembleSummary, SeedPolicy};
use cascade_io::{load_topology, write_curves_csv, write_summaries_csv};
use tabwriter::TabWriter;

use cascade_cli::cli::CompareArgs;
use cascade_cli::config::CascadeSettings;

use crate::commands::util::resolve_seed;

pub fn handle(args: &CompareArgs, settings: &CascadeSettings) -> Result<()> {
    let config = args.simulation.resolve(&settings.simulation, None);
    config.validate()?;
    let policies: Vec<SeedPolicy> = if args.policies.is_empty() {
        SeedPolicy::ALL.to_vec()
    } else {
        args.policies.clone()
    };
    let runs = args.runs.unwrap_or(settings.simulation.runs);
    let base_seed = resolve_seed(args.simulation.rng_seed(&settings.simulation));
    let ensemble = Ensemble::new(runs, base_seed);

    let topology = load_topology(&args.topology.buses, &args.topology.branches)?;
    let summaries = compare_policies(&topology, &config, &policies, &ensemble)?;

    println!(
        "Policy comparison over {} buses ({runs} runs each, alpha {}, seed fraction {}, base seed {base_seed}):",
        topology.bus_count(),
        config.alpha,
        config.seed_fraction
    );
    print_table(&summaries)?;

    if let Some(path) = &args.out {
        let file = File::create(path)
            .with_context(|| format!("creating summary file '{}'", path.display()))?;
        write_summaries_csv(&summaries, file)?;
        println!("Summary written to {}", path.display());
    }
    if let Some(path) = &args.curves {
        let file = File::create(path)
            .with_context(|| format!("creating curve file '{}'", path.display()))?;
        write_curves_csv(&summaries, file)?;
        println!("Mean curves written to {}", path.display());
    }
    Ok(())
}

fn print_table(summaries: &[EnsembleSummary]) -> Result<()> {
    let mut tw = TabWriter::new(io::stdout());
    writeln!(
        tw,
        "POLICY\tRUNS\tMEAN FAILED %\tMIN %\tMAX %\tMEAN ROUNDS\tMEAN FINAL LLC"
    )?;
    for summary in summaries {
        writeln!(
            tw,
            "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            summary.policy,
            summary.runs,
            summary.mean_failed_percent,
            summary.min_failed_percent,
            summary.max_failed_percent,
            summary.mean_rounds,
            summary.mean_final_llc
        )?;
    }
    tw.flush()?;
    Ok(())
}
