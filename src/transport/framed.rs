//! Length-prefixed framing wrapper.

use log::trace;

use crate::core::{ByteBuffer, RefillableTransport, Transport, TransportError, TransportResult};

/// Default ceiling on a received frame's declared length (16 MiB).
///
/// A hostile or corrupted peer can otherwise assert an enormous length and
/// drive an allocation of that size before a single payload byte arrives.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Wraps another transport and frames its I/O.
///
/// # Wire format
///
/// ```text
/// +---------------------------+------------------------+
/// | Length                    | Payload                |
/// | 4 bytes (BE, signed i32)  | exactly Length bytes   |
/// +---------------------------+------------------------+
/// ```
///
/// On write, the entire outgoing message accumulates in a write buffer;
/// [`flush`](Transport::flush) emits one inner `write` carrying the length
/// prefix plus payload, then flushes the inner transport. Flushing an empty
/// buffer emits a zero-length frame.
///
/// On read, one whole frame is pulled into an internal buffer before byte
/// reads are served from it. A received zero-length frame yields an empty
/// read; the following read moves on to the next frame. A negative declared
/// length fails with [`TransportError::NegativeSize`], and one above the
/// configured ceiling with [`TransportError::SizeLimit`].
#[derive(Debug)]
pub struct FramedTransport<T: Transport> {
    inner: T,
    rbuf: ByteBuffer,
    wbuf: ByteBuffer,
    frame: Vec<u8>,
    scratch: Vec<u8>,
    max_frame_size: usize,
}

impl<T: Transport> FramedTransport<T> {
    /// Wrap `inner` with the default frame size ceiling.
    pub fn new(inner: T) -> Self {
        Self::with_max_frame_size(inner, DEFAULT_MAX_FRAME_SIZE)
    }

    /// Wrap `inner`, rejecting received frames longer than `max_frame_size`.
    pub fn with_max_frame_size(inner: T, max_frame_size: usize) -> Self {
        Self {
            inner,
            rbuf: ByteBuffer::new(),
            wbuf: ByteBuffer::new(),
            frame: Vec::new(),
            scratch: Vec::new(),
            max_frame_size,
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

    /// Pull the next frame into the read buffer.
    fn read_frame(&mut self) -> TransportResult<()> {
        let mut header = [0u8; 4];
        self.inner.read_all(&mut header)?;
        let declared = i32::from_be_bytes(header);
        if declared < 0 {
            return Err(TransportError::NegativeSize(declared));
        }
        let size = declared as usize;
        if size > self.max_frame_size {
            return Err(TransportError::SizeLimit {
                size,
                limit: self.max_frame_size,
            });
        }
        trace!("framed read: frame of {size} bytes");

        self.scratch.resize(size, 0);
        self.inner.read_all(&mut self.scratch)?;
        self.rbuf.reset(&self.scratch);
        Ok(())
    }
}

impl<T: Transport> Transport for FramedTransport<T> {
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
        self.read_frame()?;
        Ok(self.rbuf.read(buf))
    }

    fn write(&mut self, buf: &[u8]) -> TransportResult<()> {
        self.wbuf.extend(buf);
        Ok(())
    }

    fn flush(&mut self) -> TransportResult<()> {
        let size = self.wbuf.len();
        let declared = i32::try_from(size).map_err(|_| TransportError::SizeLimit {
            size,
            limit: i32::MAX as usize,
        })?;

        self.frame.clear();
        self.frame.extend_from_slice(&declared.to_be_bytes());
        self.frame.extend_from_slice(self.wbuf.bytes());
        self.wbuf.clear();

        self.inner.write(&self.frame)?;
        self.inner.flush()
    }
}

impl<T: Transport> RefillableTransport for FramedTransport<T> {
    fn read_buffer(&mut self) -> &mut ByteBuffer {
        &mut self.rbuf
    }

    /// Concatenates whole frames until `required` bytes are available,
    /// letting a single logical read span frame boundaries.
    fn refill(&mut self, partial: &[u8], required: usize) -> TransportResult<&mut ByteBuffer> {
        let mut pending = partial.to_vec();
        while pending.len() < required {
            self.read_frame()?;
            pending.extend_from_slice(self.rbuf.bytes());
        }
        self.rbuf.reset(&pending);
        Ok(&mut self.rbuf)
    }
}
