//! Read command - print the lines of a log file
//!
//! Compressed files are detected by suffix (or forced with `--compress`).
//!
//! # Usage
//!
//! ```bash
//! measlog read logs/tor.log                                   # plain
//! measlog read logs/log_archive/tor_2025-01-15_10:30:45.log.xz # compressed
//! measlog read - < tor.log                                    # stdin
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use measlog_sinks::{DataSource, PipelineConfig};

/// Read command arguments
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Input file (`-` for stdin)
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Decompress even without the compressed suffix
    #[arg(long)]
    compress: bool,
}

/// Run the read command
pub async fn run(args: ReadArgs, pipeline: PipelineConfig) -> Result<()> {
    let source = DataSource::with_config(&args.path, args.compress, pipeline);

    let lines = tokio::task::spawn_blocking(move || {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        print_lines(source, &mut out)
    })
    .await
    .context("read task failed")??;

    tracing::debug!(path = %args.path.display(), lines, "read finished");
    Ok(())
}

/// Write every line of `source` to `out`, then close the source
fn print_lines(mut source: DataSource, out: &mut impl Write) -> Result<u64> {
    let name = source.filename().display().to_string();
    let mut count = 0;

    for line in source
        .lines()
        .with_context(|| format!("failed to open {name}"))?
    {
        let line = line.with_context(|| format!("failed to read {name}"))?;
        writeln!(out, "{line}")?;
        count += 1;
    }
    out.flush()?;

    source
        .close()
        .with_context(|| format!("failed to close {name}"))?;
    Ok(count)
}

#[cfg(test)]
#[path = "read_test.rs"]
mod read_test;
