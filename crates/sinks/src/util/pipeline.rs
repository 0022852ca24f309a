//! External compression processes
//!
//! Compression is delegated to a streaming compressor whose output is copied
//! into the target file by a second process:
//!
//! ```text
//! [writer] --stdin--> [xz --threads=3 -] --pipe--> [dd of=<path> oflag=append conv=notrunc]
//! ```
//!
//! The two processes form one unit: they are spawned together, and
//! `finish` (or drop) closes the compressor's stdin and waits for both.
//! Reading goes through a single `xz --decompress --stdout <path>`.
//!
//! The copier appends, so reopening a compressed target after close adds a
//! new xz stream behind the existing ones; xz decodes concatenated streams.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

use crate::{SinkError, SinkResult};

/// Default streaming compressor
pub const DEFAULT_COMPRESSOR: &str = "xz";

/// Default compressor thread count
pub const DEFAULT_COMPRESSOR_THREADS: u32 = 3;

/// Default stdin-to-file copier
pub const DEFAULT_COPIER: &str = "dd";

/// Default streaming decompressor
pub const DEFAULT_DECOMPRESSOR: &str = "xz";

/// Suffix carried by every compressed file
pub const COMPRESSED_SUFFIX: &str = ".xz";

/// Programs used for compressed targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Compressor program, invoked as `<compressor> --threads=N -`
    pub compressor: String,

    /// Thread count passed to the compressor
    pub compressor_threads: u32,

    /// Copier program, invoked as `<copier> of=<path> oflag=append conv=notrunc`
    ///
    /// These are GNU dd operands; a replacement copier must accept them.
    pub copier: String,

    /// Decompressor program, invoked as `<decompressor> --decompress --stdout <path>`
    pub decompressor: String,

    /// File suffix that marks a compressed target
    pub suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            compressor: DEFAULT_COMPRESSOR.into(),
            compressor_threads: DEFAULT_COMPRESSOR_THREADS,
            copier: DEFAULT_COPIER.into(),
            decompressor: DEFAULT_DECOMPRESSOR.into(),
            suffix: COMPRESSED_SUFFIX.into(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn with_compressor(mut self, program: impl Into<String>) -> Self {
        self.compressor = program.into();
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.compressor_threads = threads;
        self
    }

    #[must_use]
    pub fn with_copier(mut self, program: impl Into<String>) -> Self {
        self.copier = program.into();
        self
    }

    #[must_use]
    pub fn with_decompressor(mut self, program: impl Into<String>) -> Self {
        self.decompressor = program.into();
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Whether a target name carries the compressed suffix
    pub fn is_compressed_name(&self, target: &str) -> bool {
        target.ends_with(&self.suffix)
    }

    fn compressor_args(&self) -> [String; 2] {
        [format!("--threads={}", self.compressor_threads), "-".into()]
    }

    fn copier_args(path: &Path) -> [String; 3] {
        [
            format!("of={}", path.display()),
            "oflag=append".into(),
            "conv=notrunc".into(),
        ]
    }
}

/// A running compressor/copier process pair
///
/// Writes go to the compressor's stdin. Both children are always reaped,
/// either by `finish` or on drop.
pub struct CompressionPipeline {
    stdin: Option<ChildStdin>,
    compressor: Child,
    copier: Child,
    compressor_name: String,
    copier_name: String,
    reaped: bool,
}

impl CompressionPipeline {
    /// Spawn the compressor and the copier writing into `path`
    pub fn spawn(config: &PipelineConfig, path: &Path) -> SinkResult<Self> {
        let mut compressor = Command::new(&config.compressor)
            .args(config.compressor_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| SinkError::spawn(&config.compressor, e))?;

        let (Some(stdin), Some(compressed)) = (compressor.stdin.take(), compressor.stdout.take())
        else {
            reap_abandoned(&mut compressor);
            return Err(io::Error::other("compressor pipes unavailable").into());
        };

        let copier = Command::new(&config.copier)
            .args(PipelineConfig::copier_args(path))
            .stdin(Stdio::from(compressed))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let copier = match copier {
            Ok(child) => child,
            Err(e) => {
                drop(stdin);
                reap_abandoned(&mut compressor);
                return Err(SinkError::spawn(&config.copier, e));
            }
        };

        tracing::debug!(
            path = %path.display(),
            compressor_pid = compressor.id(),
            copier_pid = copier.id(),
            "compression pipeline started"
        );

        Ok(Self {
            stdin: Some(stdin),
            compressor,
            copier,
            compressor_name: config.compressor.clone(),
            copier_name: config.copier.clone(),
            reaped: false,
        })
    }

    /// Close the compressor's input and wait for both processes to exit
    ///
    /// Both processes are waited on before any failure is reported.
    pub fn finish(mut self) -> SinkResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> SinkResult<()> {
        if self.reaped {
            return Ok(());
        }
        self.reaped = true;

        // EOF on the compressor's stdin lets it flush; the copier follows
        drop(self.stdin.take());
        let compressor = self.compressor.wait();
        let copier = self.copier.wait();

        tracing::debug!(
            compressor = ?compressor.as_ref().ok(),
            copier = ?copier.as_ref().ok(),
            "compression pipeline reaped"
        );

        check_status(&self.compressor_name, compressor?)?;
        check_status(&self.copier_name, copier?)
    }
}

impl Write for CompressionPipeline {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stdin.as_mut() {
            Some(stdin) => stdin.write(buf),
            None => Err(io::ErrorKind::BrokenPipe.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stdin.as_mut() {
            Some(stdin) => stdin.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for CompressionPipeline {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// A running decompressor process
///
/// The decompressed stream is handed out separately by `spawn`; drop it
/// before calling `wait`, or the decompressor may block on a full pipe.
pub struct Decompressor {
    child: Child,
    program: String,
    reaped: bool,
}

impl Decompressor {
    /// Spawn the decompressor for `path`, returning it with its output stream
    pub fn spawn(config: &PipelineConfig, path: &Path) -> SinkResult<(Self, ChildStdout)> {
        let mut child = Command::new(&config.decompressor)
            .arg("--decompress")
            .arg("--stdout")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| SinkError::spawn(&config.decompressor, e))?;

        let Some(stdout) = child.stdout.take() else {
            reap_abandoned(&mut child);
            return Err(io::Error::other("decompressor stdout unavailable").into());
        };

        tracing::debug!(path = %path.display(), pid = child.id(), "decompressor started");

        Ok((
            Self {
                child,
                program: config.decompressor.clone(),
                reaped: false,
            },
            stdout,
        ))
    }

    /// Wait for the decompressor to exit and return its status
    pub fn wait(mut self) -> SinkResult<ExitStatus> {
        self.reaped = true;
        let status = self.child.wait()?;
        tracing::debug!(program = %self.program, %status, "decompressor reaped");
        Ok(status)
    }

    /// Name of the decompressor program
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Drop for Decompressor {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.wait();
        }
    }
}

fn check_status(program: &str, status: ExitStatus) -> SinkResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(SinkError::process_failed(program, status))
    }
}

fn reap_abandoned(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
