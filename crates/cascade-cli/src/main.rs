use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use cascade_cli::cli::{Cli, Commands};
use cascade_cli::config::load_settings;

use crate::commands::util::configure_threads;

mod commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };
    // load_settings has already checked the level name
    let level = cli
        .log_level
        .or_else(|| settings.logging.level().ok())
        .unwrap_or(tracing::Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    configure_threads(&cli.threads);

    let result = match &cli.command {
        Commands::Run(args) => {
            info!("Running cascade on {}", args.topology.buses.display());
            commands::run::handle(args, &settings)
        }
        Commands::Compare(args) => {
            info!("Comparing seed policies on {}", args.topology.buses.display());
            commands::compare::handle(args, &settings)
        }
        Commands::Stats(args) => commands::stats::handle(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
