//! Line source - the read side of `FileWritable`
//!
//! Opens a plain file, standard input, or an xz-compressed file through an
//! external decompressor, and hands it out as a lazy sequence of lines.
//!
//! ```text
//! tor.log     -> [BufReader<File>]
//! -           -> [BufReader<Stdin>]
//! tor.log.xz  -> [xz --decompress --stdout tor.log.xz] --stdout--> [BufReader]
//! ```
//!
//! Exhausting the lines does not close the source; call `close` (or drop
//! the source) to release the handle and reap the decompressor.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::util::{Decompressor, PipelineConfig};
use crate::writable::STDIO_SENTINEL;
use crate::{SinkError, SinkResult};

/// Read buffer size for files and pipes
const READ_BUFFER_SIZE: usize = 32 * 1024;

/// An opened input
struct OpenSource {
    reader: Box<dyn BufRead + Send>,
    decompressor: Option<Decompressor>,

    /// Whether the reader returned end-of-stream through `Lines`
    eof: bool,
}

/// Lazily opened, forward-only line source
pub struct DataSource {
    filename: PathBuf,
    compress: bool,
    stdin: bool,
    pipeline: PipelineConfig,
    source: Option<OpenSource>,
}

impl DataSource {
    /// Create a source for `path`
    ///
    /// `-` reads standard input. A path ending in `.xz` is decompressed even
    /// when `compress` is false. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>, compress: bool) -> Self {
        Self::with_config(path, compress, PipelineConfig::default())
    }

    /// Create a source using a custom decompressor
    pub fn with_config(path: impl Into<PathBuf>, compress: bool, pipeline: PipelineConfig) -> Self {
        let filename = path.into();
        let stdin = filename.as_os_str() == STDIO_SENTINEL;
        let compress =
            !stdin && (compress || pipeline.is_compressed_name(&filename.to_string_lossy()));

        Self {
            filename,
            compress,
            stdin,
            pipeline,
            source: None,
        }
    }

    /// Open the input if it is not open yet
    pub fn open(&mut self) -> SinkResult<()> {
        if self.source.is_none() {
            self.source = Some(self.create_source()?);
        }
        Ok(())
    }

    /// Lines of the input, without their `\n`
    ///
    /// Opens the input on first use. The iterator continues where any
    /// previous one stopped; invalid UTF-8 is replaced, not rejected.
    pub fn lines(&mut self) -> SinkResult<Lines<'_>> {
        self.open()?;
        match self.source.as_mut() {
            Some(source) => Ok(Lines { source }),
            None => Err(SinkError::Closed),
        }
    }

    /// Raw buffered handle of the input, opening it on first use
    pub fn reader(&mut self) -> SinkResult<&mut dyn BufRead> {
        self.open()?;
        match self.source.as_mut() {
            Some(source) => Ok(&mut *source.reader),
            None => Err(SinkError::Closed),
        }
    }

    /// Release the input and wait for the decompressor, if any
    ///
    /// When the lines were read to the end, a decompressor exiting
    /// unsuccessfully is reported as `SinkError::ProcessFailed`. An abandoned
    /// stream may have killed it with a closed pipe, so its status is not
    /// inspected then. Safe to call when nothing is open.
    pub fn close(&mut self) -> SinkResult<()> {
        let Some(OpenSource {
            reader,
            decompressor,
            eof,
        }) = self.source.take()
        else {
            return Ok(());
        };

        drop(reader);

        if let Some(decompressor) = decompressor {
            let program = decompressor.program().to_string();
            let status = decompressor.wait()?;
            if eof && !status.success() {
                return Err(SinkError::process_failed(program, status));
            }
        }

        tracing::debug!(path = %self.filename.display(), "source closed");
        Ok(())
    }

    /// Input path (`-` for standard input)
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Whether the input is decompressed
    pub fn is_compressed(&self) -> bool {
        self.compress
    }

    /// Whether the input is standard input
    pub fn is_stdin(&self) -> bool {
        self.stdin
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    fn create_source(&self) -> SinkResult<OpenSource> {
        let mut decompressor = None;
        let reader: Box<dyn BufRead + Send> = if self.stdin {
            Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, io::stdin()))
        } else if self.compress {
            let (child, stdout) = Decompressor::spawn(&self.pipeline, &self.filename)?;
            decompressor = Some(child);
            Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, stdout))
        } else {
            let file = File::open(&self.filename)?;
            Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file))
        };

        tracing::debug!(
            path = %self.filename.display(),
            compressed = self.compress,
            "source opened"
        );

        Ok(OpenSource {
            reader,
            decompressor,
            eof: false,
        })
    }
}

impl Drop for DataSource {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("filename", &self.filename)
            .field("compress", &self.compress)
            .field("stdin", &self.stdin)
            .field("open", &self.source.is_some())
            .finish()
    }
}

/// Iterator over the lines of a `DataSource`
pub struct Lines<'a> {
    source: &'a mut OpenSource,
}

impl Iterator for Lines<'_> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.source.eof {
            return None;
        }

        let mut line = Vec::new();
        match self.source.reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                self.source.eof = true;
                None
            }
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                Some(Ok(String::from_utf8_lossy(&line).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
