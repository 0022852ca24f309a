//! Record command - copy stdin lines into a log file
//!
//! Every input line is written as one payload, so concurrent rotation never
//! splits a line between the archive and the fresh file.
//!
//! # Usage
//!
//! ```bash
//! producer | measlog record logs/tor.log                     # plain file
//! producer | measlog record logs/tor.log --compress          # logs/tor.log.xz
//! producer | measlog record logs/tor.log --rotate-every 3600 # hourly archives
//! producer | measlog record -                                # stdout
//! ```

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use measlog_sinks::{ARCHIVE_DIR, FileWritable, PipelineConfig, Writable};
use tokio::task::JoinHandle;

/// Record command arguments
#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Output file (`-` for stdout)
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Compress output (appends the compressed suffix)
    #[arg(long)]
    compress: bool,

    /// Rotate the output into log_archive/ every SECS seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    rotate_every: Option<u64>,
}

/// Run the record command
pub async fn run(args: RecordArgs, pipeline: PipelineConfig) -> Result<()> {
    let sink = Arc::new(FileWritable::with_config(&args.path, args.compress, pipeline));
    let metrics = sink.metrics_handle();

    tracing::info!(
        path = %sink.filename().display(),
        compressed = sink.is_compressed(),
        rotate_every = ?args.rotate_every,
        "recording started"
    );

    let rotation_handle = match args.rotate_every {
        Some(secs) => {
            prepare_archive_dir(&sink)?;
            Some(spawn_rotation_task(Arc::clone(&sink), Duration::from_secs(secs)))
        }
        None => None,
    };

    let writer = Arc::clone(&sink);
    let copied = tokio::task::spawn_blocking(move || copy_lines(io::stdin().lock(), &*writer))
        .await
        .context("stdin copy task failed")?;

    if let Some(handle) = rotation_handle {
        handle.abort();
    }

    let closer = Arc::clone(&sink);
    let closed = tokio::task::spawn_blocking(move || closer.close())
        .await
        .context("close task failed")?;

    let lines = copied?;
    closed.with_context(|| format!("failed to close {}", sink.filename().display()))?;

    let snapshot = metrics.snapshot();
    tracing::info!(
        path = metrics.name(),
        lines,
        bytes = snapshot.bytes_written,
        rotations = snapshot.rotations,
        dropped = snapshot.payloads_dropped,
        "recording finished"
    );

    Ok(())
}

/// Create `log_archive/` next to the output file
fn prepare_archive_dir(sink: &FileWritable) -> Result<()> {
    anyhow::ensure!(!sink.is_stdout(), "standard output cannot be rotated");

    let dir = sink
        .filename()
        .parent()
        .unwrap_or_else(|| std::path::Path::new(""))
        .join(ARCHIVE_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create archive directory {}", dir.display()))
}

/// Rotate `sink` on a fixed interval until aborted
fn spawn_rotation_task(sink: Arc<FileWritable>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            let rotating = Arc::clone(&sink);
            // A failed rotation leaves no destination; the next write reopens
            let result = tokio::task::spawn_blocking(move || rotating.rotate_file()).await;

            match result {
                Ok(Ok(archive)) => {
                    tracing::info!(archive = %archive.display(), "file rotated");
                }
                Ok(Err(e)) => {
                    tracing::warn!(path = %sink.filename().display(), error = %e, "rotation failed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "rotation task failed");
                }
            }
        }
    })
}

/// Write every line of `input` to `sink`, returning the line count
fn copy_lines(mut input: impl BufRead, sink: &dyn Writable) -> Result<u64> {
    let mut line = Vec::with_capacity(1024);
    let mut count = 0;

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line).context("failed to read stdin")? == 0 {
            return Ok(count);
        }
        sink.write(&line).context("failed to write record")?;
        count += 1;
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;
