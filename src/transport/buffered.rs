//! Buffered transport wrapper.

use log::trace;

use crate::core::{ByteBuffer, RefillableTransport, Transport, TransportResult};

/// Default minimum chunk pulled from the inner transport on a read miss.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Wraps another transport and buffers its I/O.
///
/// Reads are amortized through a fixed-size internal buffer: a miss pulls
/// `max(requested, buffer_size)` bytes from the inner transport in a single
/// call. Writes accumulate until [`flush`](Transport::flush), which hands the
/// whole write buffer to the inner transport in one `write`, so the inner
/// transport never sees more write calls than necessary.
///
/// The write buffer is emptied before its contents are handed down, so a
/// failed flush leaves it empty and a retried `write` cannot duplicate
/// bytes.
#[derive(Debug)]
pub struct BufferedTransport<T: Transport> {
    inner: T,
    rbuf: ByteBuffer,
    wbuf: ByteBuffer,
    scratch: Vec<u8>,
    buffer_size: usize,
}

impl<T: Transport> BufferedTransport<T> {
    /// Wrap `inner` with the default buffer size.
    pub fn new(inner: T) -> Self {
        Self::with_buffer_size(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Wrap `inner`, pulling at least `buffer_size` bytes per read miss.
    pub fn with_buffer_size(inner: T, buffer_size: usize) -> Self {
        Self {
            inner,
            rbuf: ByteBuffer::new(),
            wbuf: ByteBuffer::new(),
            scratch: Vec::new(),
            buffer_size,
        }
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the wrapper, returning the wrapped transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Transport> Transport for BufferedTransport<T> {
    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn open(&mut self) -> TransportResult<()> {
        self.inner.open()
    }

    fn close(&mut self) -> TransportResult<()> {
        self.inner.close()
    }

    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        let served = self.rbuf.read(buf);
        if served != 0 {
            return Ok(served);
        }

        // Miss: pull one chunk of at least buffer_size in a single call.
        let want = buf.len().max(self.buffer_size);
        self.scratch.resize(want, 0);
        let got = self.inner.read(&mut self.scratch)?;
        trace!("buffered read miss: requested {}, pulled {got}", buf.len());
        self.rbuf.reset(&self.scratch[..got]);
        Ok(self.rbuf.read(buf))
    }

    fn write(&mut self, buf: &[u8]) -> TransportResult<()> {
        self.wbuf.extend(buf);
        Ok(())
    }

    fn flush(&mut self) -> TransportResult<()> {
        // Move the pending bytes out before writing so a failure cannot
        // leave them queued for a duplicate send.
        self.scratch.clear();
        self.scratch.extend_from_slice(self.wbuf.bytes());
        self.wbuf.clear();
        self.inner.write(&self.scratch)?;
        self.inner.flush()
    }
}

impl<T: Transport> RefillableTransport for BufferedTransport<T> {
    fn read_buffer(&mut self) -> &mut ByteBuffer {
        &mut self.rbuf
    }

    fn refill(&mut self, partial: &[u8], required: usize) -> TransportResult<&mut ByteBuffer> {
        self.scratch.clear();
        self.scratch.extend_from_slice(partial);

        // Small requests get one opportunistic over-read of a full chunk.
        if required < self.buffer_size {
            let start = self.scratch.len();
            self.scratch.resize(start + self.buffer_size, 0);
            let got = self.inner.read(&mut self.scratch[start..])?;
            self.scratch.truncate(start + got);
        }

        // Still short: top up with exactly the missing amount.
        if self.scratch.len() < required {
            let start = self.scratch.len();
            self.scratch.resize(required, 0);
            self.inner.read_all(&mut self.scratch[start..])?;
        }

        self.rbuf.reset(&self.scratch);
        Ok(&mut self.rbuf)
    }
}
