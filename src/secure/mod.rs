//! Security-negotiated transport.
//!
//! This module implements the security layer of the stack: a multi-round
//! challenge-response handshake performed before first use, followed by
//! framed traffic whose payloads pass through the negotiated context's
//! wrap/unwrap transformation.
//!
//! - [`SecurityContext`]: the authentication capability (external
//!   mechanisms implement this; the cryptographic math lives there)
//! - [`PlainContext`]: minimal built-in PLAIN mechanism
//! - [`HandshakeStatus`] / [`HandshakePhase`]: wire statuses and the
//!   explicit negotiation state machine
//! - [`SecureTransport`]: the wrapper tying it together
//!
//! Any protocol violation during the handshake is fatal: `open()` fails
//! with `NotOpen` and the transport must be reconstructed from scratch.

mod context;
mod handshake;
mod plain;
mod transport;

pub use context::SecurityContext;
pub use handshake::{HandshakeAction, HandshakePhase, HandshakeStatus, MESSAGE_HEADER_SIZE};
pub use plain::PlainContext;
pub use transport::SecureTransport;
