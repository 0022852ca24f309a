//! Compression configuration
//!
//! Names the external programs used for compressed output and input.

use measlog_sinks::PipelineConfig;
use measlog_sinks::util::{
    COMPRESSED_SUFFIX, DEFAULT_COMPRESSOR, DEFAULT_COMPRESSOR_THREADS, DEFAULT_COPIER,
    DEFAULT_DECOMPRESSOR,
};
use serde::Deserialize;

/// Compression programs
///
/// # Example
///
/// ```toml
/// [compression]
/// compressor = "xz"
/// threads = 3
/// copier = "dd"
/// decompressor = "xz"
/// suffix = ".xz"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompressionConfig {
    /// Streaming compressor reading stdin
    /// Default: xz
    pub compressor: String,

    /// Compressor thread count
    /// Default: 3
    pub threads: u32,

    /// Program copying compressed bytes into the target file
    ///
    /// Invoked with GNU dd operands (`of=<path> oflag=append conv=notrunc`),
    /// so it must be dd or a program accepting the same operands.
    /// Default: dd
    pub copier: String,

    /// Streaming decompressor writing stdout
    /// Default: xz
    pub decompressor: String,

    /// Suffix marking compressed files
    /// Default: .xz
    pub suffix: String,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            compressor: DEFAULT_COMPRESSOR.into(),
            threads: DEFAULT_COMPRESSOR_THREADS,
            copier: DEFAULT_COPIER.into(),
            decompressor: DEFAULT_DECOMPRESSOR.into(),
            suffix: COMPRESSED_SUFFIX.into(),
        }
    }
}

impl CompressionConfig {
    /// Build the sink-level pipeline settings
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_compressor(&self.compressor)
            .with_threads(self.threads)
            .with_copier(&self.copier)
            .with_decompressor(&self.decompressor)
            .with_suffix(&self.suffix)
    }
}
