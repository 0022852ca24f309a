//! Byte destinations for file sinks
//!
//! A `FileWritable` owns at most one destination at a time and writes every
//! payload straight into it. Each destination knows how to shut itself down
//! so that all bytes reach the filesystem before the sink reports the close.
//!
//! # Available Destinations
//!
//! - `FileDestination` - plain file opened in append mode
//! - `StdoutDestination` - the process's standard output
//! - `CompressionPipeline` - stdin of an external compressor (see `pipeline`)

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use super::pipeline::CompressionPipeline;
use crate::SinkResult;

/// A writable byte destination owned by a sink
///
/// Object-safe so the sink can hold `Box<dyn Destination>`.
pub trait Destination: Write + Send {
    /// Flush and release the destination, waiting for any helper processes
    fn finish(self: Box<Self>) -> SinkResult<()>;

    /// Short name for logging
    fn kind(&self) -> &'static str;
}

// ============================================================================
// FileDestination - plain append-mode file
// ============================================================================

/// Plain file opened for appending
///
/// Unbuffered: each payload is handed to the kernel in `write_all`, so a
/// concurrent reader sees whole payloads and close has nothing left to flush.
pub struct FileDestination {
    file: File,
}

impl FileDestination {
    /// Open (or create) `path` for appending
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl Write for FileDestination {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Destination for FileDestination {
    fn finish(mut self: Box<Self>) -> SinkResult<()> {
        self.file.flush()?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}

// ============================================================================
// StdoutDestination - standard output
// ============================================================================

/// Standard output
///
/// Finishing only flushes; the process-wide handle stays usable.
pub struct StdoutDestination {
    out: io::Stdout,
}

impl StdoutDestination {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutDestination {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdoutDestination {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    // Keep one payload contiguous against other users of stdout
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.out.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Destination for StdoutDestination {
    fn finish(mut self: Box<Self>) -> SinkResult<()> {
        self.out.flush()?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "stdout"
    }
}

// ============================================================================
// CompressionPipeline
// ============================================================================

impl Destination for CompressionPipeline {
    fn finish(self: Box<Self>) -> SinkResult<()> {
        CompressionPipeline::finish(*self)
    }

    fn kind(&self) -> &'static str {
        "compressed"
    }
}

#[cfg(test)]
#[path = "destination_test.rs"]
mod destination_test;
