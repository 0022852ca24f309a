//! The `Writable` capability shared by all sinks

use crate::SinkResult;

/// Path sentinel meaning standard output (sinks) or standard input (sources)
pub const STDIO_SENTINEL: &str = "-";

/// A destination for outgoing record payloads
///
/// Implementations must keep every `write` call contiguous in the output:
/// concurrent callers never see their payloads interleaved byte-wise.
/// `close` releases everything the sink owns and may be called more than
/// once. Whether a `write` after `close` reopens, drops, or fails is up to
/// the implementation.
pub trait Writable: Send + Sync {
    /// Write a payload verbatim
    fn write(&self, payload: &[u8]) -> SinkResult<()>;

    /// Release all resources held by the sink
    fn close(&self) -> SinkResult<()>;

    /// Write a text payload
    fn write_str(&self, payload: &str) -> SinkResult<()> {
        self.write(payload.as_bytes())
    }
}
