//! Solver Binary
//!
//! Runs one fulfillment run end to end: read the last deposit on Chain A,
//! fulfill it on Chain B, prove the fulfillment via the attestation
//! service, claim on Chain A.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin solver -- --config config/solver.toml
//! ```
//!
//! Or set the config path via environment variable:
//!
//! ```bash
//! SOLVER_CONFIG_PATH=config/solver.toml cargo run --bin solver
//! ```
//!
//! A run interrupted after its fulfillment order confirmed can be resumed
//! from its checkpoint without re-submitting the order:
//!
//! ```bash
//! cargo run --bin solver -- --resume /var/run/solver/checkpoint.json
//! ```

use anyhow::Result;
use clap::Parser;
use deposit_solver::{Checkpoint, FulfillmentService, SolverConfig};
use std::path::Path;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "solver")]
#[command(about = "Cross-chain deposit solver - fulfills deposits and claims with storage proofs")]
struct Args {
    /// Path to solver configuration file (default: config/solver.toml or SOLVER_CONFIG_PATH env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Resume from a run checkpoint instead of reading the latest deposit
    #[arg(short, long)]
    resume: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize structured logging
    tracing_subscriber::fmt::init();

    info!("Starting deposit solver");

    let config = SolverConfig::load_from_path(args.config.as_deref())?;
    info!("Chain A: {} (chain ID: {})", config.chain_a.name, config.chain_a.chain_id);
    info!("Chain B: {} (chain ID: {})", config.chain_b.name, config.chain_b.chain_id);
    info!("Attestation service: {}", config.attestation.api_url);

    let service = FulfillmentService::from_config(&config)?;

    let outcome = match &args.resume {
        Some(path) => {
            info!("Resuming from checkpoint: {path}");
            let checkpoint = Checkpoint::load(Path::new(path))?;
            service.resume(checkpoint).await
        }
        None => service.run().await,
    };

    match outcome {
        Ok(report) => {
            info!(
                "Cross-chain transfer completed: deposit {} fulfilled at block {} (order {}, query {})",
                report.deposit_id, report.fulfillment_block, report.order_id, report.query_id
            );
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {e}");
            Err(e.into())
        }
    }
}
