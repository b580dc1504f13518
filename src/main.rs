use clap::Parser;

mod cli;
mod database;
mod error;
mod find_union;
mod gml;
mod graph;
mod merge;
mod naming;
mod sequences;

use anyhow::{Context, Result};
use cli::Cli;
use database::DbConfig;
use log::info;

fn main() -> Result<()> {
    // Parse CLI arguments and set up logging.
    let args = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();
    let (directory, min_support) = args.get_input();
    let out_dir = args.get_output();

    // Check inputs; build the database.
    let config = DbConfig::from_panaroo_dir(directory, out_dir, min_support)?;
    let stats = database::generate_db(&config)
        .with_context(|| format!("failed to build ARIBA database from {}", directory.display()))?;
    info!(
        "Done: {} of {} gene rows written ({} not in any group)",
        stats.emitted, stats.rows, stats.skipped
    );
    Ok(())
}
