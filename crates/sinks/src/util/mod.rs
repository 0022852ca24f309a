//! Building blocks for the file sink and the line source
//!
//! - **archive**: rotation file naming (pure path logic)
//! - **destination**: the byte destinations a `FileWritable` writes into
//! - **pipeline**: external compressor/copier/decompressor processes
//!
//! ```text
//! FileWritable --write--> [Destination] --> file
//!                              |
//!                              +--> [xz --threads=N -] --pipe--> [dd of=<path>] --> file.xz
//!
//! DataSource <--lines-- [xz --decompress --stdout <path>] <-- file.xz
//! ```

pub mod archive;
pub mod destination;
pub mod pipeline;

pub use archive::{ARCHIVE_DIR, ARCHIVE_TIMESTAMP_FORMAT, archive_path, archive_timestamp};
pub use destination::{Destination, FileDestination, StdoutDestination};
pub use pipeline::{
    COMPRESSED_SUFFIX, CompressionPipeline, DEFAULT_COMPRESSOR, DEFAULT_COMPRESSOR_THREADS,
    DEFAULT_COPIER, DEFAULT_DECOMPRESSOR, Decompressor, PipelineConfig,
};
