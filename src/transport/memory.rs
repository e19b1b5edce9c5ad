//! In-memory transport.

use crate::core::{ByteBuffer, RefillableTransport, Transport, TransportError, TransportResult};

/// A transport backed by a single in-memory byte buffer.
///
/// Constructed empty for writing, or pre-seeded (optionally with a start
/// offset) for reading. Useful both as a real transport that stages a
/// message body before it goes anywhere, and as a fixture for round-trip
/// tests of the layers above.
///
/// Writes append to the buffer and reads consume from the front, so a value
/// written through the transport can be read back through it.
///
/// # Example
///
/// ```rust
/// use strata_transport::prelude::*;
///
/// let mut t = MemoryTransport::from_bytes(b"hello".to_vec());
/// let mut out = [0u8; 3];
/// let n = t.read(&mut out).unwrap();
/// assert_eq!(&out[..n], b"hel");
/// ```
#[derive(Debug)]
pub struct MemoryTransport {
    buffer: ByteBuffer,
    open: bool,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// Create an empty transport in write mode.
    pub fn new() -> Self {
        Self {
            buffer: ByteBuffer::new(),
            open: true,
        }
    }

    /// Create a transport pre-seeded with `value` for reading.
    pub fn from_bytes(value: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: ByteBuffer::from_bytes(value),
            open: true,
        }
    }

    /// Create a transport pre-seeded with `value`, reading from `offset`.
    pub fn with_offset(value: impl Into<Vec<u8>>, offset: usize) -> Self {
        Self {
            buffer: ByteBuffer::with_offset(value, offset),
            open: true,
        }
    }

    /// Everything written or seeded so far, consumed or not.
    pub fn value(&self) -> &[u8] {
        self.buffer.bytes()
    }

    fn check_open(&self) -> TransportResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(TransportError::NotOpen("memory buffer closed".into()))
        }
    }
}

impl Transport for MemoryTransport {
    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self) -> TransportResult<()> {
        Ok(())
    }

    fn close(&mut self) -> TransportResult<()> {
        self.open = false;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        self.check_open()?;
        Ok(self.buffer.read(buf))
    }

    fn write(&mut self, buf: &[u8]) -> TransportResult<()> {
        self.check_open()?;
        self.buffer.extend(buf);
        Ok(())
    }

    fn flush(&mut self) -> TransportResult<()> {
        self.check_open()
    }
}

impl RefillableTransport for MemoryTransport {
    fn read_buffer(&mut self) -> &mut ByteBuffer {
        &mut self.buffer
    }

    /// Always fails: no producer ever adds bytes beyond what the buffer
    /// already holds.
    fn refill(
        &mut self,
        _partial: &[u8],
        _required: usize,
    ) -> TransportResult<&mut ByteBuffer> {
        Err(TransportError::EndOfFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_read_sequence() {
        let mut t = MemoryTransport::from_bytes(b"hello".to_vec());

        let mut out = [0u8; 3];
        assert_eq!(t.read(&mut out).unwrap(), 3);
        assert_eq!(&out, b"hel");

        let mut out = [0u8; 10];
        assert_eq!(t.read(&mut out).unwrap(), 2);
        assert_eq!(&out[..2], b"lo");

        // Past the end: empty result, not an error.
        let mut out = [0u8; 1];
        assert_eq!(t.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_write_then_value() {
        let mut t = MemoryTransport::new();
        t.write(b"abc").unwrap();
        t.write(b"def").unwrap();
        t.flush().unwrap();
        assert_eq!(t.value(), b"abcdef");
    }

    #[test]
    fn test_write_then_read_back() {
        let mut t = MemoryTransport::new();
        t.write(b"pong").unwrap();
        let mut out = [0u8; 4];
        t.read_all(&mut out).unwrap();
        assert_eq!(&out, b"pong");
    }

    #[test]
    fn test_offset_skips_prefix() {
        let mut t = MemoryTransport::with_offset(b"hello".to_vec(), 3);
        let mut out = [0u8; 5];
        assert_eq!(t.read(&mut out).unwrap(), 2);
        assert_eq!(&out[..2], b"lo");
    }

    #[test]
    fn test_read_all_past_end_is_eof() {
        let mut t = MemoryTransport::from_bytes(b"hi".to_vec());
        let mut out = [0u8; 4];
        let err = t.read_all(&mut out).unwrap_err();
        assert!(matches!(err, TransportError::EndOfFile));
    }

    #[test]
    fn test_closed_rejects_io() {
        let mut t = MemoryTransport::from_bytes(b"data".to_vec());
        assert!(t.is_open());
        t.close().unwrap();
        assert!(!t.is_open());

        let mut out = [0u8; 1];
        assert!(matches!(
            t.read(&mut out).unwrap_err(),
            TransportError::NotOpen(_)
        ));
        assert!(matches!(
            t.write(b"x").unwrap_err(),
            TransportError::NotOpen(_)
        ));
    }

    #[test]
    fn test_refill_always_eof() {
        let mut t = MemoryTransport::from_bytes(b"data".to_vec());
        let err = t.refill(b"", 1).unwrap_err();
        assert!(err.is_eof());
    }
}
