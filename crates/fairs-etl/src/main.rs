//! fairs-etl - Main entry point

use clap::Parser;
use fairs_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use fairs_common::FileFailureLog;
use fairs_etl::cli::{Cli, Commands, ImportArgs};
use fairs_etl::dataset::dataset_for;
use fairs_etl::db::{self, DbConfig};
use fairs_etl::pipeline::ImportPipeline;
use fairs_etl::store::{MemoryFairStore, PgFairStore};
use std::process;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let base = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .output(LogOutput::Console)
        .log_file_prefix("fairs-etl")
        .build();

    // LOG_* variables take precedence
    let log_config = base.clone().merge_env().unwrap_or(base);
    let guard = init_logging(&log_config).ok();

    let result = match &cli.command {
        Commands::Import(args) => import(args).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        drop(guard);
        process::exit(1);
    }
}

async fn import(args: &ImportArgs) -> fairs_etl::Result<()> {
    let file = args.resolve_file()?;
    let failure_log = Arc::new(FileFailureLog::from_env());
    info!(path = %failure_log.path().display(), "Failure log");

    let summary = if args.dry_run {
        let store = MemoryFairStore::new();
        let dataset = dataset_for(file, store, Arc::clone(&failure_log));
        ImportPipeline::new(args.source_config(), dataset).run().await?
    } else {
        let config = DbConfig::from_env()?;
        let pool = db::connect(&config, &*failure_log).await?;
        let store = PgFairStore::new(pool);
        let dataset = dataset_for(file, store, Arc::clone(&failure_log));
        ImportPipeline::new(args.source_config(), dataset).run().await?
    };

    println!(
        "{} {}: {} census areas, {} census sectors, {} boroughs, {} districts, {} fairs",
        if args.dry_run { "Checked" } else { "Imported" },
        file,
        summary.census_areas,
        summary.census_sectors,
        summary.boroughs,
        summary.districts,
        summary.fairs
    );

    Ok(())
}
