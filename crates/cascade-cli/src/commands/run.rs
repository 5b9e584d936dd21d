use std::io::Write;

use anyhow::Result;
use cascade_algo::{CascadeEngine, CascadeOutcome};
use cascade_io::{load_topology, write_outcome_json, write_series_csv};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use cascade_cli::cli::{OutputFormat, RunArgs};
use cascade_cli::config::CascadeSettings;

use crate::commands::util::{open_output, resolve_seed};

pub fn handle(args: &RunArgs, settings: &CascadeSettings) -> Result<()> {
    let config = args.simulation.resolve(&settings.simulation, args.policy);
    config.validate()?;

    let topology = load_topology(&args.topology.buses, &args.topology.branches)?;
    let seed = resolve_seed(args.simulation.rng_seed(&settings.simulation));
    let engine = CascadeEngine::new(&topology);
    let outcome = engine.run(&config, &mut StdRng::seed_from_u64(seed))?;
    info!(
        rounds = outcome.rounds,
        failed = outcome.failed.len(),
        final_llc = outcome.final_llc,
        "cascade finished"
    );

    // summary goes to stderr when the series itself is written to stdout
    let summary = summary_lines(&outcome, &config.policy.to_string(), config.alpha, seed).join("\n");
    if args.out.is_some() {
        println!("{summary}");
    } else {
        eprintln!("{summary}");
    }

    let mut writer = open_output(args.out.as_deref())?;
    match args.format {
        OutputFormat::Csv => write_series_csv(&outcome, &mut writer)?,
        OutputFormat::Json => write_outcome_json(&outcome, &mut writer)?,
    }
    writer.flush()?;
    if let Some(path) = &args.out {
        println!("Series written to {}", path.display());
    }
    Ok(())
}

fn summary_lines(outcome: &CascadeOutcome, policy: &str, alpha: f64, seed: u64) -> Vec<String> {
    vec![
        format!(
            "Cascade over {} buses (policy {policy}, alpha {alpha}, rng seed {seed}):",
            outcome.bus_count
        ),
        format!("  Seeds         : {}", outcome.seeds.len()),
        format!(
            "  Rounds        : {}{}",
            outcome.rounds,
            if outcome.truncated { " (truncated)" } else { "" }
        ),
        format!(
            "  Failed        : {} ({:.2}%)",
            outcome.failed.len(),
            outcome.final_failed_percent()
        ),
        format!("  Final LLC     : {}", outcome.final_llc),
        "  Samples are taken before each round's transmissions.".to_string(),
    ]
}
