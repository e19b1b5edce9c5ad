//! Reusable position-tracked byte buffer.
//!
//! Every wrapper in the stack owns one or two of these: a read buffer that
//! is refilled wholesale (buffered, secure) or per-frame (framed), and a
//! write buffer that accumulates bytes between flushes. Consumed bytes are
//! never re-served, and [`reset`](ByteBuffer::reset) reuses the existing
//! allocation instead of discarding it.

/// A growable byte buffer with a read cursor.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    pos: usize,
}

impl ByteBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `bytes`, cursor at the start.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            data: bytes.into(),
            pos: 0,
        }
    }

    /// Create a buffer holding `bytes` with the cursor advanced to `offset`.
    ///
    /// An offset past the end leaves nothing to read.
    pub fn with_offset(bytes: impl Into<Vec<u8>>, offset: usize) -> Self {
        let data: Vec<u8> = bytes.into();
        let pos = offset.min(data.len());
        Self { data, pos }
    }

    /// Copy up to `out.len()` unconsumed bytes into `out`, advancing the
    /// cursor. Returns the number of bytes copied (0 when exhausted).
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    /// Append `bytes` at the end of the buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Replace the contents with `bytes` and rewind the cursor, keeping the
    /// existing allocation.
    pub fn reset(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.pos = 0;
    }

    /// Empty the buffer and rewind the cursor, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
        self.pos = 0;
    }

    /// The entire contents, consumed or not.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of unconsumed bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Total number of bytes held (consumed or not).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if unconsumed bytes remain.
    pub fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_advances_cursor() {
        let mut buf = ByteBuffer::from_bytes(b"hello".to_vec());
        let mut out = [0u8; 3];
        assert_eq!(buf.read(&mut out), 3);
        assert_eq!(&out, b"hel");

        let mut out = [0u8; 10];
        assert_eq!(buf.read(&mut out), 2);
        assert_eq!(&out[..2], b"lo");

        // Exhausted: reads return 0, never re-serve consumed bytes.
        assert_eq!(buf.read(&mut out), 0);
        assert!(!buf.has_remaining());
    }

    #[test]
    fn test_offset_construction() {
        let mut buf = ByteBuffer::with_offset(b"hello".to_vec(), 2);
        let mut out = [0u8; 5];
        assert_eq!(buf.read(&mut out), 3);
        assert_eq!(&out[..3], b"llo");

        // Offset past the end is clamped.
        let buf = ByteBuffer::with_offset(b"hi".to_vec(), 10);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_extend_then_read() {
        let mut buf = ByteBuffer::new();
        buf.extend(b"ab");
        buf.extend(b"cd");
        assert_eq!(buf.bytes(), b"abcd");

        let mut out = [0u8; 4];
        assert_eq!(buf.read(&mut out), 4);
        assert_eq!(&out, b"abcd");
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut buf = ByteBuffer::from_bytes(vec![0u8; 256]);
        let cap = buf.data.capacity();
        buf.reset(b"xy");
        assert_eq!(buf.bytes(), b"xy");
        assert_eq!(buf.remaining(), 2);
        assert!(buf.data.capacity() >= cap.min(256));
    }

    #[test]
    fn test_clear() {
        let mut buf = ByteBuffer::from_bytes(b"data".to_vec());
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.remaining(), 0);
    }
}
