//! Memory sink - in-process buffer with line read-back
//!
//! Collects every payload in a growable buffer. Used by tests and by callers
//! that aggregate records before deciding where they go.
//!
//! Reads advance a cursor independent of writes, so a test can interleave
//! `write` and `read_line` and see each line exactly once.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::writable::Writable;
use crate::{SinkError, SinkResult, WritableMetrics, WritableMetricsHandle};

#[derive(Debug, Default)]
struct MemoryBuffer {
    data: Vec<u8>,
    cursor: usize,
    closed: bool,
}

/// In-memory sink
///
/// After `close` the buffer is released and every operation except `close`
/// returns `SinkError::Closed`.
#[derive(Debug, Default)]
pub struct MemoryWritable {
    buffer: Mutex<MemoryBuffer>,
    metrics: Arc<WritableMetrics>,
}

impl MemoryWritable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the next line, without its `\n`
    ///
    /// Returns `None` once the cursor reaches the end of the buffer. A final
    /// line without a terminator is returned as-is.
    pub fn read_line(&self) -> SinkResult<Option<String>> {
        let mut buffer = self.buffer.lock();
        if buffer.closed {
            return Err(SinkError::Closed);
        }

        let start = buffer.cursor;
        if start >= buffer.data.len() {
            return Ok(None);
        }

        let rest = &buffer.data[start..];
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        let line = String::from_utf8_lossy(line).into_owned();

        buffer.cursor += consumed;
        Ok(Some(line))
    }

    /// All bytes written so far
    pub fn contents(&self) -> SinkResult<Vec<u8>> {
        let buffer = self.buffer.lock();
        if buffer.closed {
            return Err(SinkError::Closed);
        }
        Ok(buffer.data.clone())
    }

    /// Number of buffered bytes (0 once closed)
    pub fn len(&self) -> usize {
        self.buffer.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.buffer.lock().closed
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &WritableMetrics {
        &self.metrics
    }

    /// Get a metrics handle that outlives the sink
    pub fn metrics_handle(&self) -> WritableMetricsHandle {
        WritableMetricsHandle::new("memory", Arc::clone(&self.metrics))
    }
}

impl Writable for MemoryWritable {
    fn write(&self, payload: &[u8]) -> SinkResult<()> {
        let mut buffer = self.buffer.lock();
        if buffer.closed {
            return Err(SinkError::Closed);
        }
        buffer.data.extend_from_slice(payload);
        self.metrics.record_write(payload.len() as u64);
        Ok(())
    }

    fn close(&self) -> SinkResult<()> {
        let mut buffer = self.buffer.lock();
        if !buffer.closed {
            *buffer = MemoryBuffer {
                closed: true,
                ..MemoryBuffer::default()
            };
            self.metrics.record_close();
            tracing::trace!("memory sink closed");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;
