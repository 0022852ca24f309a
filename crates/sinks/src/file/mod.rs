//! File sink - durable, optionally compressed record output
//!
//! Writes payloads to a file (or standard output), optionally piping them
//! through an external xz compressor. Supports rotating the active file into
//! a timestamped archive without losing or duplicating bytes.
//!
//! # Lifecycle
//!
//! ```text
//!            write / open            close
//! [Unopened] ------------> [Open] ---------> [Closed]
//!    ^  |                    ^                  |
//!    |  +------ close -------|----------------->|
//!    |                       +------ open ------+
//!    +---- failed rotation (from any state)
//! ```
//!
//! A `write` in `Closed` finds no destination: the payload is dropped and
//! counted in `payloads_dropped`. Only an explicit `open` (or a rotation)
//! leaves `Closed`. A failed rotation leaves `Unopened`, so the next `write`
//! reopens at the original path.
//!
//! # Rotation
//!
//! `rotate_file` holds the sink's lock for the whole sequence
//! close → move → reopen, so no write lands between the archived file and
//! the fresh one:
//!
//! ```text
//! logs/tor.log.xz  --move-->  logs/log_archive/tor_2025-01-15_10:30:45.log.xz
//! logs/tor.log.xz  (fresh)
//! ```
//!
//! The `log_archive/` directory must already exist, and an existing archive
//! of the same name is never replaced.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::util::{
    CompressionPipeline, Destination, FileDestination, PipelineConfig, StdoutDestination,
    archive_path, archive_timestamp,
};
use crate::writable::{STDIO_SENTINEL, Writable};
use crate::{SinkError, SinkResult, WritableMetrics, WritableMetricsHandle};

/// Destination state guarded by the sink's lock
enum SinkState {
    /// Constructed, nothing opened yet
    Unopened,

    /// A destination is active
    Open(Box<dyn Destination>),

    /// Closed explicitly
    Closed,
}

impl SinkState {
    fn name(&self) -> &'static str {
        match self {
            SinkState::Unopened => "unopened",
            SinkState::Open(_) => "open",
            SinkState::Closed => "closed",
        }
    }
}

/// Thread-safe file sink with optional external compression
///
/// One lock serialises `open`, `write`, `close` and `rotate_file`; every
/// payload reaches the destination as one contiguous unit.
pub struct FileWritable {
    /// Effective target path (with the compressed suffix when compressing)
    filename: PathBuf,

    /// Whether payloads go through the compression pipeline
    compress: bool,

    /// Whether the target is standard output
    stdout: bool,

    /// Programs used for compressed targets
    pipeline: PipelineConfig,

    /// Current destination
    state: Mutex<SinkState>,

    /// Lifecycle counters (Arc for sharing with metrics handles)
    metrics: Arc<WritableMetrics>,
}

impl FileWritable {
    /// Create a sink for `path`, compressing with the default xz pipeline
    ///
    /// `-` targets standard output and never compresses. A path ending in
    /// `.xz` compresses even when `compress` is false; a compressing sink
    /// appends `.xz` to a path that lacks it. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>, compress: bool) -> Self {
        Self::with_config(path, compress, PipelineConfig::default())
    }

    /// Create a sink using custom compression programs
    pub fn with_config(path: impl Into<PathBuf>, compress: bool, pipeline: PipelineConfig) -> Self {
        let path = path.into();
        let stdout = path.as_os_str() == STDIO_SENTINEL;

        let (filename, compress) = if stdout {
            (path, false)
        } else if compress || pipeline.is_compressed_name(&path.to_string_lossy()) {
            (with_suffix(path, &pipeline.suffix), true)
        } else {
            (path, false)
        };

        Self {
            filename,
            compress,
            stdout,
            pipeline,
            state: Mutex::new(SinkState::Unopened),
            metrics: Arc::new(WritableMetrics::new()),
        }
    }

    /// Open a destination if none is active
    pub fn open(&self) -> SinkResult<()> {
        let mut state = self.state.lock();
        self.open_locked(&mut state)
    }

    /// Rotate the active file into `log_archive/`, stamped with the current time
    ///
    /// Returns the archive path.
    pub fn rotate_file(&self) -> SinkResult<PathBuf> {
        self.rotate_file_at(Local::now())
    }

    /// Rotate the active file into `log_archive/`, stamped with `at`
    ///
    /// On failure the sink is left without a destination; the next `write`
    /// (or `open`) resumes output at the original path.
    pub fn rotate_file_at(&self, at: DateTime<Local>) -> SinkResult<PathBuf> {
        let mut state = self.state.lock();

        if self.stdout {
            return Err(SinkError::unsupported("cannot rotate standard output"));
        }
        let archive = archive_path(&self.filename, &archive_timestamp(at)).ok_or_else(|| {
            SinkError::unsupported(format!(
                "cannot derive an archive name for {}",
                self.filename.display()
            ))
        })?;

        if let Err(e) = self.rotate_locked(&mut state, &archive) {
            if !matches!(*state, SinkState::Open(_)) {
                *state = SinkState::Unopened;
            }
            return Err(e);
        }

        self.metrics.record_rotation();
        tracing::debug!(
            path = %self.filename.display(),
            archive = %archive.display(),
            "file rotation completed"
        );

        Ok(archive)
    }

    /// Effective target path
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Whether output is compressed
    pub fn is_compressed(&self) -> bool {
        self.compress
    }

    /// Whether output goes to standard output
    pub fn is_stdout(&self) -> bool {
        self.stdout
    }

    /// Whether a destination is currently active
    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), SinkState::Open(_))
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &WritableMetrics {
        &self.metrics
    }

    /// Get a metrics handle that outlives the sink
    pub fn metrics_handle(&self) -> WritableMetricsHandle {
        WritableMetricsHandle::new(self.filename.display().to_string(), Arc::clone(&self.metrics))
    }

    fn rotate_locked(&self, state: &mut SinkState, archive: &Path) -> SinkResult<()> {
        self.close_locked(state)?;
        move_file(&self.filename, archive)
            .map_err(|e| SinkError::rotate(&self.filename, archive, e))?;
        self.open_locked(state)
    }

    fn open_locked(&self, state: &mut SinkState) -> SinkResult<()> {
        if matches!(state, SinkState::Open(_)) {
            return Ok(());
        }

        let destination = self.create_destination()?;
        tracing::debug!(
            path = %self.filename.display(),
            kind = destination.kind(),
            "destination opened"
        );

        *state = SinkState::Open(destination);
        self.metrics.record_open();
        Ok(())
    }

    fn create_destination(&self) -> SinkResult<Box<dyn Destination>> {
        if self.stdout {
            Ok(Box::new(StdoutDestination::new()))
        } else if self.compress {
            Ok(Box::new(CompressionPipeline::spawn(&self.pipeline, &self.filename)?))
        } else {
            Ok(Box::new(FileDestination::open(&self.filename)?))
        }
    }

    fn close_locked(&self, state: &mut SinkState) -> SinkResult<()> {
        match std::mem::replace(state, SinkState::Closed) {
            SinkState::Open(destination) => {
                let kind = destination.kind();
                self.metrics.record_close();
                let result = destination.finish();
                tracing::debug!(
                    path = %self.filename.display(),
                    kind,
                    ok = result.is_ok(),
                    "destination closed"
                );
                result
            }
            SinkState::Unopened | SinkState::Closed => Ok(()),
        }
    }
}

impl Writable for FileWritable {
    fn write(&self, payload: &[u8]) -> SinkResult<()> {
        let mut state = self.state.lock();

        if matches!(*state, SinkState::Unopened) {
            self.open_locked(&mut state)?;
        }

        match &mut *state {
            SinkState::Open(destination) => {
                destination.write_all(payload)?;
                self.metrics.record_write(payload.len() as u64);
            }
            SinkState::Unopened | SinkState::Closed => {
                self.metrics.record_dropped();
                tracing::trace!(
                    path = %self.filename.display(),
                    bytes = payload.len(),
                    "no destination, payload dropped"
                );
            }
        }

        Ok(())
    }

    fn close(&self) -> SinkResult<()> {
        let mut state = self.state.lock();
        self.close_locked(&mut state)
    }
}

impl Drop for FileWritable {
    fn drop(&mut self) {
        if let SinkState::Open(destination) =
            std::mem::replace(self.state.get_mut(), SinkState::Closed)
        {
            let _ = destination.finish();
        }
    }
}

impl fmt::Debug for FileWritable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileWritable")
            .field("filename", &self.filename)
            .field("compress", &self.compress)
            .field("stdout", &self.stdout)
            .field("state", &self.state.lock().name())
            .finish()
    }
}

/// Append `suffix` to `path` unless it already ends with it
fn with_suffix(path: PathBuf, suffix: &str) -> PathBuf {
    if path.to_string_lossy().ends_with(suffix) {
        return path;
    }
    let mut name = path.into_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Move a file, copying when the archive is on another filesystem
///
/// Never replaces an existing archive: two rotations within the same second
/// map to the same name.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "archive file already exists",
        ));
    }

    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        result => result,
    }
}
