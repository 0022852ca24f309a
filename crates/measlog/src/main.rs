//! measlog - Record and read measurement logs
//!
//! # Usage
//!
//! ```bash
//! # Copy stdin into a compressed log, rotating every hour
//! tor-ctl-events | measlog record logs/tor.log --compress --rotate-every 3600
//!
//! # Print a (possibly compressed) log
//! measlog read logs/log_archive/tor_2025-01-15_10:30:45.log.xz
//!
//! # Read stdin
//! cat tor.log | measlog read -
//! ```

mod cmd;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use measlog_config::Config;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// measlog - Record and read measurement logs
#[derive(Parser, Debug)]
#[command(name = "measlog")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy stdin lines into a log file, optionally compressed and rotated
    Record(cmd::record::RecordArgs),

    /// Print the lines of a log file (or stdin) to stdout
    Read(cmd::read::ReadArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level)?;

    let pipeline = config.compression.pipeline();
    match cli.command {
        Command::Record(args) => cmd::record::run(args, pipeline).await,
        Command::Read(args) => cmd::read::run(args, pipeline).await,
    }
}

/// Load the config file if one was given, defaults otherwise
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr; stdout carries record output.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();

    Ok(())
}
