//! The transport contract and the optional direct-buffer capability.
//!
//! [`Transport`] is the contract every layer implements; wrappers compose by
//! owning another `Transport` and forwarding, transforming, or deferring
//! bytes to it. [`RefillableTransport`] is a second, separate capability for
//! consumers that want to operate directly on a layer's read buffer instead
//! of copying through `read`. A transport that cannot support it simply
//! does not implement it, and callers bound on the capability type-check for
//! it rather than assume it.

use super::buffer::ByteBuffer;
use super::error::{TransportError, TransportResult};

/// Blocking byte-stream transport.
///
/// # Contract
///
/// - `read` returns between 0 and `buf.len()` bytes and may return fewer
///   than requested even when more data will later be available
/// - `read_all` is the only built-in retry loop: it masks short reads but
///   converts end-of-stream into [`TransportError::EndOfFile`]
/// - every operation may block on the underlying I/O object
/// - errors from the wrapped transport propagate unchanged
pub trait Transport {
    /// True if the transport is open for I/O.
    fn is_open(&self) -> bool;

    /// Open the transport.
    fn open(&mut self) -> TransportResult<()>;

    /// Close the transport.
    fn close(&mut self) -> TransportResult<()>;

    /// Read up to `buf.len()` bytes into `buf`, returning the count read.
    ///
    /// A return of 0 means no bytes are obtainable right now (for bounded
    /// sources, the end of the data).
    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize>;

    /// Queue or send all of `buf`.
    fn write(&mut self, buf: &[u8]) -> TransportResult<()>;

    /// Push any buffered bytes down to the wrapped transport.
    fn flush(&mut self) -> TransportResult<()>;

    /// Read exactly `buf.len()` bytes, looping over [`read`](Self::read).
    ///
    /// Fails with [`TransportError::EndOfFile`] the moment an underlying
    /// read returns zero bytes before the target is met.
    fn read_all(&mut self, buf: &mut [u8]) -> TransportResult<()> {
        let mut have = 0;
        while have < buf.len() {
            let n = self.read(&mut buf[have..])?;
            if n == 0 {
                return Err(TransportError::EndOfFile);
            }
            have += n;
        }
        Ok(())
    }
}

/// Direct access to a transport's internal read buffer.
///
/// High-throughput consumers (codecs parsing many small fields) use this to
/// bypass per-call copies through [`Transport::read`] and work on contiguous
/// memory instead.
pub trait RefillableTransport: Transport {
    /// The current read buffer.
    fn read_buffer(&mut self) -> &mut ByteBuffer;

    /// Replace the read buffer so it holds at least `required` bytes,
    /// with `partial` (bytes the consumer already pulled out) as its prefix.
    ///
    /// Fails with [`TransportError::EndOfFile`] if `required` bytes cannot
    /// be obtained. Returns the refilled buffer.
    fn refill(&mut self, partial: &[u8], required: usize)
    -> TransportResult<&mut ByteBuffer>;
}
