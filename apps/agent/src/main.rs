//! Watchpost agent: composition root.
//!
//! Loads the global configuration, discovers monitor definitions, runs
//! one engine pass and exits 0 once the pass completes, whatever the
//! individual verdicts were. Only a missing or unparseable global
//! configuration is fatal.

mod config;
mod database;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use watchpost::discovery::discover_monitors;
use watchpost::persist::{FileSink, ResultSink};
use watchpost::{Dispatcher, Engine};

use crate::config::Config;
use crate::database::DatabaseSink;

const DEFAULT_CONFIG_PATH: &str = "/etc/watchpost/watchpost.toml";

#[derive(Parser, Debug)]
#[command(name = "watchpost-agent", version, about = "Periodic health-check agent")]
struct Cli {
    /// Enable debug logging on standard output
    #[arg(long)]
    debug: bool,

    /// Global configuration file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    initfile: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.debug);

    let config = Config::from_file(&cli.initfile)
        .with_context(|| format!("fatal: cannot load configuration {}", cli.initfile.display()))?;
    debug!("{config}");

    let sinks = build_sinks(&config).await?;
    if sinks.is_empty() {
        warn!("no output destination configured, results will only be logged");
    }

    let dispatcher = Dispatcher::with_defaults(config.check_settings())
        .context("cannot build checker registry")?;
    let engine = Engine::new(dispatcher, sinks, config.checks.concurrency);

    let discovered = discover_monitors(&config.monitor_dir)?;
    for (path, reason) in &discovered.errors {
        warn!(file = %path.display(), %reason, "ignored malformed monitor definition");
    }

    let summary = engine.run(discovered.monitors).await;
    println!(
        "checked {} monitors: {} passed, {} failed, {} skipped ({} definition files ignored)",
        summary.total,
        summary.passed,
        summary.failed,
        summary.skipped,
        discovered.errors.len()
    );

    // A completed pass exits 0 regardless of individual outcomes
    Ok(())
}

async fn build_sinks(config: &Config) -> Result<Vec<Arc<dyn ResultSink>>> {
    let mut sinks: Vec<Arc<dyn ResultSink>> = Vec::new();

    if let Some(file) = &config.output.file {
        sinks.push(Arc::new(FileSink::new(file)));
    }

    if let Some(database) = &config.output.database {
        sinks.push(Arc::new(DatabaseSink::open(database).await?));
    }

    Ok(sinks)
}
