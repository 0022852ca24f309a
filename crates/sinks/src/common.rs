//! Common types shared by sinks and sources
//!
//! Errors, the result alias, and the lifecycle counters kept by every
//! `Writable` implementation.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Result type for sink and source operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Lifecycle counters for a writable sink
///
/// All counters are relaxed atomics; they are observational only and never
/// participate in the sink's own synchronisation.
#[derive(Debug, Default)]
pub struct WritableMetrics {
    /// Destinations opened (initial open, reopen after close, after rotation)
    pub opens: AtomicU64,

    /// Payloads written to a destination
    pub writes: AtomicU64,

    /// Payload bytes written (before compression)
    pub bytes_written: AtomicU64,

    /// Payloads dropped because no destination was established
    pub payloads_dropped: AtomicU64,

    /// Destinations closed
    pub closes: AtomicU64,

    /// Completed rotations
    pub rotations: AtomicU64,
}

impl WritableMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            opens: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            payloads_dropped: AtomicU64::new(0),
            closes: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
        }
    }

    /// Count an opened destination
    #[inline]
    pub fn record_open(&self) {
        self.opens.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a delivered payload of `bytes` bytes
    #[inline]
    pub fn record_write(&self, bytes: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Count a payload dropped for lack of a destination
    #[inline]
    pub fn record_dropped(&self) {
        self.payloads_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a closed destination
    #[inline]
    pub fn record_close(&self) {
        self.closes.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a completed rotation
    #[inline]
    pub fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            opens: self.opens.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            payloads_dropped: self.payloads_dropped.load(Ordering::Relaxed),
            closes: self.closes.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of writable metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub opens: u64,
    pub writes: u64,
    pub bytes_written: u64,
    pub payloads_dropped: u64,
    pub closes: u64,
    pub rotations: u64,
}

/// Handle for reading a sink's metrics
///
/// Holds an Arc to the counters, so it stays valid after the sink itself has
/// been moved into another thread or dropped.
#[derive(Debug, Clone)]
pub struct WritableMetricsHandle {
    name: String,
    metrics: Arc<WritableMetrics>,
}

impl WritableMetricsHandle {
    pub(crate) fn new(name: impl Into<String>, metrics: Arc<WritableMetrics>) -> Self {
        Self {
            name: name.into(),
            metrics,
        }
    }

    /// Name of the sink these metrics belong to (its target path)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Errors from sinks and sources
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O error on a file, pipe or standard stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External program could not be started
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External program exited unsuccessfully
    #[error("'{program}' exited with {status}")]
    ProcessFailed { program: String, status: ExitStatus },

    /// Moving the active file into the archive failed
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Rotate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation not supported by this sink
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Sink was closed and cannot be used
    #[error("sink is closed")]
    Closed,
}

impl SinkError {
    /// Create a spawn error
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a process failure error
    pub fn process_failed(program: impl Into<String>, status: ExitStatus) -> Self {
        Self::ProcessFailed {
            program: program.into(),
            status,
        }
    }

    /// Create a rotation error
    pub fn rotate(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Rotate {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Create an unsupported-operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
