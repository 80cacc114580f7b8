// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` Sequencer Runner
//!
//! Plays a scenario headlessly and prints what happened:
//! - Loads the scenario from a RON file
//! - Ticks the top-level sequence until it stops or the tick budget runs out
//! - Prints the run report as JSON on stdout
//!
//! `sequencer_run --template` prints an empty scenario to start from.
//!
//! Logging goes to stderr and follows `RUST_LOG`.

mod error;
mod runner;
mod scenario;

use error::RunnerError;
use scenario::Scenario;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ordoplay_sequencer=debug,ordoplay_sequencer_cli=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting OrdoPlay Sequencer Runner v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_from_args() {
        tracing::error!("Run failed: {e}");
        std::process::exit(1);
    }
}

fn run_from_args() -> Result<(), RunnerError> {
    let arg = std::env::args().nth(1).ok_or(RunnerError::MissingScenario)?;
    if arg == "--template" {
        println!("{}", Scenario::default().to_ron()?);
        return Ok(());
    }

    let path = PathBuf::from(arg);
    tracing::info!("Loading scenario from {}", path.display());
    let scenario = Scenario::load(&path)?;
    let report = runner::run(&scenario)?;

    println!("{}", report.to_json()?);
    Ok(())
}
