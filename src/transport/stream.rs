//! Adapter over `std::io` stream objects.

use std::io::{Read, Write};

use crate::core::{Transport, TransportResult};

/// Exposes an already-open readable/writable stream as a transport.
///
/// A thin 1:1 adapter for files, pipes, or anything else implementing
/// [`Read`] + [`Write`]: no buffering, no framing, no refill capability.
/// `is_open` is always true and `close` is a no-op: dropping the transport
/// closes the stream, as is usual for owned `std::io` objects.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use strata_transport::prelude::*;
///
/// let mut t = StreamTransport::new(Cursor::new(b"payload".to_vec()));
/// let mut out = [0u8; 7];
/// t.read_all(&mut out).unwrap();
/// assert_eq!(&out, b"payload");
/// ```
#[derive(Debug)]
pub struct StreamTransport<S: Read + Write> {
    stream: S,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap an open stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// The wrapped stream.
    pub fn inner(&self) -> &S {
        &self.stream
    }

    /// Consume the adapter, returning the wrapped stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn is_open(&self) -> bool {
        true
    }

    fn open(&mut self) -> TransportResult<()> {
        Ok(())
    }

    fn close(&mut self) -> TransportResult<()> {
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        Ok(self.stream.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> TransportResult<()> {
        self.stream.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> TransportResult<()> {
        self.stream.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_forwards() {
        let mut t = StreamTransport::new(Cursor::new(b"stream data".to_vec()));
        let mut out = [0u8; 6];
        t.read_all(&mut out).unwrap();
        assert_eq!(&out, b"stream");
    }

    #[test]
    fn test_read_at_end_returns_zero() {
        let mut t = StreamTransport::new(Cursor::new(Vec::new()));
        let mut out = [0u8; 4];
        assert_eq!(t.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_write_forwards() {
        let mut t = StreamTransport::new(Cursor::new(Vec::new()));
        t.write(b"abc").unwrap();
        t.write(b"def").unwrap();
        t.flush().unwrap();
        assert_eq!(t.into_inner().into_inner(), b"abcdef");
    }

    #[test]
    fn test_always_open() {
        let mut t = StreamTransport::new(Cursor::new(Vec::new()));
        assert!(t.is_open());
        t.open().unwrap();
        t.close().unwrap();
        assert!(t.is_open());
    }
}
