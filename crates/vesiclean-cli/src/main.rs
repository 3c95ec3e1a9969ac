mod cli;
mod config;
mod error;
mod logging;
mod progress;

use crate::cli::Cli;
use crate::error::Result;
use crate::progress::CliProgressHandler;
use clap::Parser;
use tracing::{debug, error, info};
use vesiclean::engine::progress::ProgressReporter;
use vesiclean::engine::simulate::CommandEngine;
use vesiclean::workflows::equilibrate;

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file)?;

    info!("🚀 vesiclean v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let resolved = config::resolve(&cli)?;
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let mut engine = CommandEngine::new(resolved.engine_program, resolved.engine_args);

    let result = equilibrate::run(&resolved.pipeline, &mut engine, &reporter);

    match &result {
        Ok(summary) => {
            for report in &summary.reports {
                info!(
                    phase = report.phase.label(),
                    solvent_removed = report.solvent_removed,
                    lipids_removed = report.lipids_removed,
                    ions_removed = report.ions_removed,
                    retained_atoms = report.retained_atoms,
                    "Phase complete"
                );
            }
            if summary.stopped_early {
                println!(
                    "✅ Stopped after phase 4 as requested. Resume later with --run-mode phase-5-only."
                );
            } else {
                println!("✅ Equilibration sequence completed.");
            }
        }
        Err(e) => {
            error!("❌ Equilibration failed: {}", e);
        }
    }

    result.map(|_| ()).map_err(Into::into)
}
