//! The security-negotiated transport wrapper.

use log::{debug, trace};

use crate::core::{ByteBuffer, RefillableTransport, Transport, TransportError, TransportResult};
use crate::secure::context::SecurityContext;
use crate::secure::handshake::{
    self, HandshakeAction, HandshakePhase, HandshakeStatus, MESSAGE_HEADER_SIZE,
};
use crate::transport::DEFAULT_MAX_FRAME_SIZE;

/// Wraps another transport and a [`SecurityContext`], negotiating a security
/// layer on `open()` and wrap/unwrap-protecting every message after it.
///
/// # Lifecycle
///
/// 1. `open()` opens the inner transport if needed, announces the mechanism
///    and initial token, then drives the challenge-response loop through the
///    [`HandshakePhase`] state machine.
/// 2. Established traffic is framed exactly like
///    [`FramedTransport`](crate::transport::FramedTransport), except each
///    outgoing payload passes through [`SecurityContext::wrap`] before the
///    length prefix is attached, and each received frame payload through
///    [`SecurityContext::unwrap_received`] before it is served.
/// 3. `close()` disposes the context, then closes the inner transport.
///
/// A failed negotiation is terminal: every later call fails with `NotOpen`
/// and the transport must be reconstructed from scratch.
#[derive(Debug)]
pub struct SecureTransport<T: Transport, C: SecurityContext> {
    inner: T,
    ctx: C,
    phase: HandshakePhase,
    rbuf: ByteBuffer,
    wbuf: ByteBuffer,
    frame: Vec<u8>,
    scratch: Vec<u8>,
    max_frame_size: usize,
}

impl<T: Transport, C: SecurityContext> SecureTransport<T, C> {
    /// Wrap `inner` with `ctx` and the default frame size ceiling.
    pub fn new(inner: T, ctx: C) -> Self {
        Self::with_max_frame_size(inner, ctx, DEFAULT_MAX_FRAME_SIZE)
    }

    /// Wrap `inner` with `ctx`, rejecting received frames (and handshake
    /// payloads) longer than `max_frame_size`.
    pub fn with_max_frame_size(inner: T, ctx: C, max_frame_size: usize) -> Self {
        Self {
            inner,
            ctx,
            phase: HandshakePhase::Idle,
            rbuf: ByteBuffer::new(),
            wbuf: ByteBuffer::new(),
            frame: Vec::new(),
            scratch: Vec::new(),
            max_frame_size,
        }
    }

    /// Where the negotiation stands.
    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn check_established(&self) -> TransportResult<()> {
        if self.phase == HandshakePhase::Established {
            Ok(())
        } else {
            Err(TransportError::NotOpen(
                "security negotiation not complete".into(),
            ))
        }
    }

    fn send_message(&mut self, status: HandshakeStatus, payload: &[u8]) -> TransportResult<()> {
        let message = handshake::encode_message(status, payload);
        self.inner.write(&message)?;
        self.inner.flush()
    }

    fn recv_message(&mut self) -> TransportResult<(u8, Vec<u8>)> {
        let mut header = [0u8; MESSAGE_HEADER_SIZE];
        self.inner.read_all(&mut header)?;

        let status = header[0];
        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&header[1..]);
        let length = u32::from_be_bytes(length_bytes) as usize;
        if length > self.max_frame_size {
            return Err(TransportError::SizeLimit {
                size: length,
                limit: self.max_frame_size,
            });
        }

        let mut payload = vec![0u8; length];
        if length > 0 {
            self.inner.read_all(&mut payload)?;
        }
        Ok((status, payload))
    }

    fn negotiate(&mut self) -> TransportResult<()> {
        let mechanism = self.ctx.mechanism().to_owned();
        debug!("handshake: starting negotiation ({mechanism})");
        self.send_message(HandshakeStatus::Start, mechanism.as_bytes())?;
        let token = self.ctx.initial_token()?;
        self.send_message(HandshakeStatus::Ok, &token)?;

        loop {
            let (status_byte, payload) = self.recv_message()?;
            let Some(status) = HandshakeStatus::from_byte(status_byte) else {
                return Err(TransportError::NotOpen(format!(
                    "bad negotiation status: {status_byte} ({})",
                    String::from_utf8_lossy(&payload)
                )));
            };

            let (phase, action) =
                handshake::advance(self.phase, status, &payload, &mut self.ctx)?;
            self.phase = phase;
            match action {
                HandshakeAction::Respond(response) => {
                    self.send_message(HandshakeStatus::Ok, &response)?;
                }
                HandshakeAction::Establish => return Ok(()),
            }
        }
    }

    /// Pull the next frame, unwrap its payload, and make it the read buffer.
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
        trace!("secure read: frame of {size} wrapped bytes");

        self.scratch.resize(size, 0);
        self.inner.read_all(&mut self.scratch)?;
        let unwrapped = self.ctx.unwrap_received(&self.scratch)?;
        self.rbuf.reset(&unwrapped);
        Ok(())
    }
}

impl<T: Transport, C: SecurityContext> Transport for SecureTransport<T, C> {
    fn is_open(&self) -> bool {
        self.phase == HandshakePhase::Established && self.inner.is_open()
    }

    fn open(&mut self) -> TransportResult<()> {
        match self.phase {
            HandshakePhase::Established => return Err(TransportError::AlreadyOpen),
            HandshakePhase::Failed => {
                return Err(TransportError::NotOpen(
                    "previous negotiation failed; reconstruct the transport".into(),
                ));
            }
            HandshakePhase::Idle | HandshakePhase::Negotiating => {}
        }

        if !self.inner.is_open() {
            self.inner.open()?;
        }

        self.phase = HandshakePhase::Negotiating;
        let result = self.negotiate();
        if result.is_err() {
            self.phase = HandshakePhase::Failed;
        }
        result
    }

    fn close(&mut self) -> TransportResult<()> {
        self.ctx.dispose();
        self.inner.close()
    }

    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        self.check_established()?;
        let served = self.rbuf.read(buf);
        if served != 0 {
            return Ok(served);
        }
        self.read_frame()?;
        Ok(self.rbuf.read(buf))
    }

    fn write(&mut self, buf: &[u8]) -> TransportResult<()> {
        self.check_established()?;
        self.wbuf.extend(buf);
        Ok(())
    }

    fn flush(&mut self) -> TransportResult<()> {
        self.check_established()?;

        let wrapped = self.ctx.wrap(self.wbuf.bytes())?;
        self.wbuf.clear();

        let size = wrapped.len();
        let declared = i32::try_from(size).map_err(|_| TransportError::SizeLimit {
            size,
            limit: i32::MAX as usize,
        })?;

        self.frame.clear();
        self.frame.extend_from_slice(&declared.to_be_bytes());
        self.frame.extend_from_slice(&wrapped);

        self.inner.write(&self.frame)?;
        self.inner.flush()
    }
}

impl<T: Transport, C: SecurityContext> RefillableTransport for SecureTransport<T, C> {
    fn read_buffer(&mut self) -> &mut ByteBuffer {
        &mut self.rbuf
    }

    fn refill(&mut self, partial: &[u8], required: usize) -> TransportResult<&mut ByteBuffer> {
        self.check_established()?;
        let mut pending = partial.to_vec();
        while pending.len() < required {
            self.read_frame()?;
            pending.extend_from_slice(self.rbuf.bytes());
        }
        self.rbuf.reset(&pending);
        Ok(&mut self.rbuf)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::secure::handshake::encode_message;

    /// One side of a scripted conversation: reads come from a pre-seeded
    /// receive buffer, writes are captured for inspection.
    struct DuplexTransport {
        rx: ByteBuffer,
        tx: Vec<u8>,
        open: bool,
        fail_writes: usize,
    }

    impl DuplexTransport {
        fn new(rx: Vec<u8>) -> Self {
            Self {
                rx: ByteBuffer::from_bytes(rx),
                tx: Vec::new(),
                open: false,
                fail_writes: 0,
            }
        }
    }

    impl Transport for DuplexTransport {
        fn is_open(&self) -> bool {
            self.open
        }

        fn open(&mut self) -> TransportResult<()> {
            self.open = true;
            Ok(())
        }

        fn close(&mut self) -> TransportResult<()> {
            self.open = false;
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
            Ok(self.rx.read(buf))
        }

        fn write(&mut self, buf: &[u8]) -> TransportResult<()> {
            if self.fail_writes > 0 {
                self.fail_writes -= 1;
                return Err(TransportError::Unknown("injected write failure".into()));
            }
            self.tx.extend_from_slice(buf);
            Ok(())
        }

        fn flush(&mut self) -> TransportResult<()> {
            Ok(())
        }
    }

    /// Mechanism double: reverses challenges, XOR-masks payloads.
    struct MockContext {
        complete_after_initial: bool,
        complete: bool,
        disposed: Rc<Cell<bool>>,
    }

    impl MockContext {
        fn new() -> Self {
            Self {
                complete_after_initial: true,
                complete: false,
                disposed: Rc::new(Cell::new(false)),
            }
        }

        fn never_complete() -> Self {
            Self {
                complete_after_initial: false,
                ..Self::new()
            }
        }
    }

    impl SecurityContext for MockContext {
        fn mechanism(&self) -> &str {
            "X-MOCK"
        }

        fn initial_token(&mut self) -> TransportResult<Vec<u8>> {
            self.complete = self.complete_after_initial;
            Ok(b"init".to_vec())
        }

        fn process(&mut self, challenge: &[u8]) -> TransportResult<Vec<u8>> {
            Ok(challenge.iter().rev().copied().collect())
        }

        fn is_complete(&self) -> bool {
            self.complete
        }

        fn wrap(&mut self, data: &[u8]) -> TransportResult<Vec<u8>> {
            Ok(data.iter().map(|b| b ^ 0xAA).collect())
        }

        fn unwrap_received(&mut self, data: &[u8]) -> TransportResult<Vec<u8>> {
            Ok(data.iter().map(|b| b ^ 0xAA).collect())
        }

        fn dispose(&mut self) {
            self.disposed.set(true);
        }
    }

    fn mask(data: &[u8]) -> Vec<u8> {
        data.iter().map(|b| b ^ 0xAA).collect()
    }

    fn data_frame(wrapped: &[u8]) -> Vec<u8> {
        let mut bytes = (wrapped.len() as i32).to_be_bytes().to_vec();
        bytes.extend_from_slice(wrapped);
        bytes
    }

    /// Server script: one challenge round, then completion.
    fn happy_script() -> Vec<u8> {
        let mut script = encode_message(HandshakeStatus::Ok, b"challenge");
        script.extend_from_slice(&encode_message(HandshakeStatus::Complete, b""));
        script
    }

    #[test]
    fn test_handshake_success() {
        let inner = DuplexTransport::new(happy_script());
        let mut t = SecureTransport::new(inner, MockContext::new());

        t.open().unwrap();
        assert_eq!(t.phase(), HandshakePhase::Established);
        assert!(t.is_open());

        // Sent: Start(mechanism), Ok(initial token), Ok(reversed challenge).
        let mut expected = encode_message(HandshakeStatus::Start, b"X-MOCK");
        expected.extend_from_slice(&encode_message(HandshakeStatus::Ok, b"init"));
        expected.extend_from_slice(&encode_message(HandshakeStatus::Ok, b"egnellahc"));
        assert_eq!(t.inner().tx, expected);
    }

    #[test]
    fn test_handshake_bad_status_is_fatal() {
        let script = encode_message(HandshakeStatus::Bad, b"denied");
        let mut t = SecureTransport::new(DuplexTransport::new(script), MockContext::new());

        let err = t.open().unwrap_err();
        assert!(matches!(err, TransportError::NotOpen(_)));
        assert_eq!(t.phase(), HandshakePhase::Failed);

        // No frame was ever sent: only the two opening handshake messages.
        let mut expected = encode_message(HandshakeStatus::Start, b"X-MOCK");
        expected.extend_from_slice(&encode_message(HandshakeStatus::Ok, b"init"));
        assert_eq!(t.inner().tx, expected);

        // The instance stays unusable.
        assert!(matches!(t.open().unwrap_err(), TransportError::NotOpen(_)));
        assert!(matches!(t.write(b"x").unwrap_err(), TransportError::NotOpen(_)));
    }

    #[test]
    fn test_handshake_error_status_is_fatal() {
        let script = encode_message(HandshakeStatus::Error, b"mechanism failure");
        let mut t = SecureTransport::new(DuplexTransport::new(script), MockContext::new());

        assert!(matches!(t.open().unwrap_err(), TransportError::NotOpen(_)));
        assert_eq!(t.phase(), HandshakePhase::Failed);
    }

    #[test]
    fn test_handshake_unknown_status_is_fatal() {
        let mut script = vec![0x09];
        script.extend_from_slice(&4u32.to_be_bytes());
        script.extend_from_slice(b"????");
        let mut t = SecureTransport::new(DuplexTransport::new(script), MockContext::new());

        let err = t.open().unwrap_err();
        let TransportError::NotOpen(message) = err else {
            panic!("expected NotOpen");
        };
        assert!(message.contains('9'));
    }

    #[test]
    fn test_premature_complete_is_fatal() {
        let script = encode_message(HandshakeStatus::Complete, b"");
        let mut t =
            SecureTransport::new(DuplexTransport::new(script), MockContext::never_complete());

        let err = t.open().unwrap_err();
        let TransportError::NotOpen(message) = err else {
            panic!("expected NotOpen");
        };
        assert!(message.contains("erroneously"));
        assert_eq!(t.phase(), HandshakePhase::Failed);
    }

    #[test]
    fn test_open_twice_rejected() {
        let mut t =
            SecureTransport::new(DuplexTransport::new(happy_script()), MockContext::new());
        t.open().unwrap();
        assert!(matches!(t.open().unwrap_err(), TransportError::AlreadyOpen));
    }

    #[test]
    fn test_io_before_open_rejected() {
        let mut t =
            SecureTransport::new(DuplexTransport::new(Vec::new()), MockContext::new());
        let mut out = [0u8; 1];
        assert!(matches!(t.read(&mut out).unwrap_err(), TransportError::NotOpen(_)));
        assert!(matches!(t.write(b"x").unwrap_err(), TransportError::NotOpen(_)));
        assert!(matches!(t.flush().unwrap_err(), TransportError::NotOpen(_)));
    }

    #[test]
    fn test_flush_wraps_and_frames() {
        let mut t =
            SecureTransport::new(DuplexTransport::new(happy_script()), MockContext::new());
        t.open().unwrap();
        let handshake_len = t.inner().tx.len();

        t.write(b"se").unwrap();
        t.write(b"cret").unwrap();
        t.flush().unwrap();

        let mut expected = 6i32.to_be_bytes().to_vec();
        expected.extend_from_slice(&mask(b"secret"));
        assert_eq!(&t.inner().tx[handshake_len..], expected);
    }

    #[test]
    fn test_failed_flush_discards_pending_bytes() {
        let mut t =
            SecureTransport::new(DuplexTransport::new(happy_script()), MockContext::new());
        t.open().unwrap();
        let handshake_len = t.inner().tx.len();

        t.write(b"doomed").unwrap();
        t.inner.fail_writes = 1;
        let err = t.flush().unwrap_err();
        assert!(matches!(err, TransportError::Unknown(_)));

        // Retrying after the failure must not resend the discarded bytes:
        // the new frame carries a wrapped empty payload.
        t.flush().unwrap();
        assert_eq!(&t.inner().tx[handshake_len..], 0i32.to_be_bytes());
    }

    #[test]
    fn test_read_unwraps_frames() {
        let mut script = happy_script();
        script.extend_from_slice(&data_frame(&mask(b"reply")));
        let mut t = SecureTransport::new(DuplexTransport::new(script), MockContext::new());
        t.open().unwrap();

        let mut out = [0u8; 5];
        t.read_all(&mut out).unwrap();
        assert_eq!(&out, b"reply");
    }

    #[test]
    fn test_negative_frame_rejected() {
        let mut script = happy_script();
        script.extend_from_slice(&(-1i32).to_be_bytes());
        let mut t = SecureTransport::new(DuplexTransport::new(script), MockContext::new());
        t.open().unwrap();

        let mut out = [0u8; 1];
        assert!(matches!(
            t.read(&mut out).unwrap_err(),
            TransportError::NegativeSize(-1)
        ));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut script = happy_script();
        script.extend_from_slice(&1024i32.to_be_bytes());
        let inner = DuplexTransport::new(script);
        let mut t = SecureTransport::with_max_frame_size(inner, MockContext::new(), 256);
        t.open().unwrap();

        let mut out = [0u8; 1];
        assert!(matches!(
            t.read(&mut out).unwrap_err(),
            TransportError::SizeLimit { size: 1024, limit: 256 }
        ));
    }

    #[test]
    fn test_refill_spans_frames() {
        let mut script = happy_script();
        script.extend_from_slice(&data_frame(&mask(b"abc")));
        script.extend_from_slice(&data_frame(&mask(b"defg")));
        let mut t = SecureTransport::new(DuplexTransport::new(script), MockContext::new());
        t.open().unwrap();

        let buf = t.refill(b"", 6).unwrap();
        assert_eq!(buf.bytes(), b"abcdefg");
    }

    #[test]
    fn test_close_disposes_then_closes_inner() {
        let mut t =
            SecureTransport::new(DuplexTransport::new(happy_script()), MockContext::new());
        let disposed = Rc::clone(&t.ctx.disposed);
        t.open().unwrap();

        t.close().unwrap();
        assert!(disposed.get());
        assert!(!t.inner().is_open());
    }
}
