//! Command line entry point for bughouse-elo
//!
//! Loads configuration, fetches every available game record, rates the
//! games and prints the team and player tables.

use anyhow::{Context, Result};
use bughouse_elo::config::{validate_config, AppConfig};
use bughouse_elo::metrics::MetricsCollector;
use bughouse_elo::report::{self, ReportFormat};
use bughouse_elo::service::Pipeline;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Bughouse Elo - team ratings from a bughouse game archive
#[derive(Parser)]
#[command(
    name = "bughouse-elo",
    version,
    about = "Compute team Elo ratings and player statistics for bughouse games",
    long_about = "Fetches bughouse game records one id at a time until the archive runs out, \
                 rates every partnership with a paired Elo update in game order, and reports \
                 per-team and per-player match counts, win rates and current ratings."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Archive URL override
    #[arg(long, value_name = "URL", help = "Override the game archive base URL")]
    base_url: Option<String>,

    /// Read records from a directory instead of the archive
    #[arg(long, value_name = "DIR", help = "Read {id}.pgn files from a directory")]
    input_dir: Option<PathBuf>,

    /// Safety bound override
    #[arg(long, value_name = "N", help = "Stop after fetching this many records")]
    max_games: Option<u64>,

    /// Report format override
    #[arg(short, long, value_enum, help = "Report format")]
    format: Option<ReportFormat>,

    /// Report destination
    #[arg(short, long, value_name = "FILE", help = "Write the report to a file")]
    output: Option<PathBuf>,

    /// Metrics destination
    #[arg(
        long,
        value_name = "FILE",
        help = "Write Prometheus metrics in text format to a file"
    )]
    metrics_output: Option<PathBuf>,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without fetching")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with run information
fn display_startup_banner(config: &AppConfig) {
    info!("Bughouse Elo {}", bughouse_elo::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    match &config.source.directory {
        Some(directory) => info!("   Source: directory {}", directory.display()),
        None => info!("   Source: {}", config.source.base_url),
    }
    info!(
        "   Games: from id {}, at most {}",
        config.source.first_game_id, config.source.max_games
    );
    info!(
        "   Rating: start {}, match id base {}, K-factor {:?}",
        config.rating.start_rating, config.rating.match_id_base, config.rating.k_factor
    );
    info!("   Report: {}", config.report.format);
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    // Start with environment-based config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(base_url) = &args.base_url {
        config.source.base_url = base_url.clone();
    }

    if let Some(input_dir) = &args.input_dir {
        config.source.directory = Some(input_dir.clone());
    }

    if let Some(max_games) = args.max_games {
        config.source.max_games = max_games;
    }

    if let Some(format) = args.format {
        config.report.format = format;
    }

    if let Some(output) = &args.output {
        config.report.output = Some(output.clone());
    }

    if let Some(metrics_output) = &args.metrics_output {
        config.report.metrics_output = Some(metrics_output.clone());
    }

    validate_config(&config)?;
    Ok(config)
}

async fn run(config: &AppConfig) -> Result<()> {
    let metrics = Arc::new(MetricsCollector::new()?);
    let pipeline = Pipeline::from_config(config, metrics.clone());

    let run_report = pipeline.run().await?;

    let rendered = report::render(&run_report, config.report.format)?;
    report::write_output(&rendered, config.report.output.as_deref())?;

    if let Some(path) = &config.report.metrics_output {
        std::fs::write(path, metrics.render_text()?)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        info!("Metrics written to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without fetching");
        return Ok(());
    }

    if let Err(e) = run(&config).await {
        error!("Rating run failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
