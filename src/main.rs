//! CSV-Harvest main entry point
//!
//! This is the command-line interface for the CSV-Harvest link collector.

use anyhow::{bail, Context};
use clap::Parser;
use csv_harvest::config::{load_config_with_hash, validate, Config};
use csv_harvest::crawler::{clean_directory, run_harvest};
use csv_harvest::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CSV-Harvest: a search-driven CSV contact collector
///
/// CSV-Harvest searches for downloadable CSV files matching a query, skips
/// links collected by earlier runs, and stores cleaned, contact-scoped copies
/// of the documents that pass content policy.
#[derive(Parser, Debug)]
#[command(name = "csv-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A search-driven CSV contact collector", long_about = None)]
struct Cli {
    /// Free-text search query
    #[arg(value_name = "QUERY", required_unless_present = "clean_dir")]
    query: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Maximum number of new links to collect
    #[arg(long, value_name = "N")]
    max_links: Option<usize>,

    /// Skip the external formatter and split steps
    #[arg(long)]
    no_format: bool,

    /// Re-clean the CSV files already in the storage directory and exit
    #[arg(long)]
    clean_dir: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.clean_dir {
        handle_clean_dir(&config).await
    } else {
        let query = cli.query.join(" ");
        if query.trim().is_empty() {
            bail!("a non-empty search query is required");
        }
        handle_harvest(config, &query).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("csv_harvest=info,warn"),
            1 => EnvFilter::new("csv_harvest=debug,info"),
            2 => EnvFilter::new("csv_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(max_links) = cli.max_links {
        config.search.max_links = max_links;
    }
    if cli.no_format {
        config.formatter.enabled = false;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, query: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Link limit: {}, history: {}, output directory: {}",
        config.search.max_links,
        config.storage.links_file,
        config.storage.csv_dir
    );

    match run_harvest(config, query).await {
        Ok(stats) => {
            tracing::info!("Harvest completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --clean-dir mode: re-cleans stored files without searching
async fn handle_clean_dir(config: &Config) -> anyhow::Result<()> {
    let stats = clean_directory(config)
        .await
        .with_context(|| format!("failed to clean {}", config.storage.csv_dir))?;
    print_statistics(&stats);
    Ok(())
}
