//! measlog - Sinks
//!
//! Durable, optionally compressed record sinks and their read-side
//! counterpart.
//!
//! # Architecture
//!
//! Every sink implements `Writable` and serialises its own state behind one
//! lock, so a single sink can be shared by many writer threads. Compression
//! is delegated to external processes:
//!
//! ```text
//! [threads] --write--> [FileWritable] --> [file | stdout | xz -> dd -> file.xz]
//!                            |
//!                       rotate_file --> log_archive/<stem>_<timestamp><ext>
//!
//! [file | stdin | xz -d file.xz] --> [DataSource] --lines--> [reader]
//! ```
//!
//! # Available Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | `FileWritable` | File or stdout output, optional xz, rotation |
//! | `MemoryWritable` | In-memory buffer with line read-back |
//! | `DataSource` | Plain, stdin or xz input as lazy lines |
//!
//! # Example
//!
//! ```ignore
//! use measlog_sinks::{DataSource, FileWritable, Writable};
//!
//! let sink = FileWritable::new("logs/tor.log", true);
//! sink.write(b"650 BW 1024 2048\n")?;
//! let archive = sink.rotate_file()?;
//! sink.close()?;
//!
//! let mut source = DataSource::new(&archive, false);
//! for line in source.lines()? {
//!     println!("{}", line?);
//! }
//! source.close()?;
//! ```

// =============================================================================
// Sink and source implementations (each in its own submodule)
// =============================================================================

/// File sink - plain, stdout or xz-compressed output with rotation
pub mod file;

/// Memory sink - in-process buffer
pub mod memory;

/// Line source - plain, stdin or xz-compressed input
pub mod source;

// =============================================================================
// Shared utilities
// =============================================================================

/// The `Writable` capability
pub mod writable;

/// Destinations, compression processes and archive naming
pub mod util;

/// Common types shared by all sinks (errors, metrics)
mod common;

#[cfg(test)]
mod test_utils;

// =============================================================================
// Public re-exports
// =============================================================================

pub use common::{MetricsSnapshot, SinkError, SinkResult, WritableMetrics, WritableMetricsHandle};
pub use writable::{STDIO_SENTINEL, Writable};

pub use file::FileWritable;
pub use memory::MemoryWritable;
pub use source::{DataSource, Lines};
pub use util::{ARCHIVE_DIR, COMPRESSED_SUFFIX, PipelineConfig};
