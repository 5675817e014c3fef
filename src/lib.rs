pub mod advisor;
pub mod analysis;
pub mod classify;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod data;
pub mod formulas;
pub mod frequency;
pub mod grid;
pub mod io_utils;
pub mod stats;
pub mod summary;
pub mod table;
pub mod timestamp;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Dispatching {:?}", cli.command);
    match cli.command {
        Commands::Probe(args) => classify::execute(&args),
        Commands::Stats(args) => stats::execute(&args),
        Commands::Correlate(args) => correlation::execute(&args),
        Commands::Summary(args) => summary::execute(&args),
        Commands::Advise(args) => advisor::execute(&args),
        Commands::Analyze(args) => analysis::execute(&args),
        Commands::Timestamp(args) => timestamp::execute(&args),
        Commands::InitConfig(args) => config::execute(&args),
    }
}
