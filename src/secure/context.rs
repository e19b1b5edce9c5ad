//! The authentication capability consumed by [`SecureTransport`].
//!
//! [`SecureTransport`]: crate::secure::SecureTransport

use crate::core::TransportResult;

/// A negotiable security mechanism.
///
/// Implementations own the cryptographic side of the handshake: computing
/// challenge responses and, once negotiation succeeds, transforming message
/// payloads (encryption, integrity protection, or nothing at all). The
/// transport drives the message exchange; it never interprets tokens or
/// challenges itself.
pub trait SecurityContext {
    /// Name of the mechanism, as sent in the handshake's first message
    /// (e.g. `"PLAIN"`, `"GSSAPI"`).
    fn mechanism(&self) -> &str;

    /// The token to send immediately after the mechanism announcement.
    fn initial_token(&mut self) -> TransportResult<Vec<u8>>;

    /// Compute the response to a server challenge.
    fn process(&mut self, challenge: &[u8]) -> TransportResult<Vec<u8>>;

    /// True once the mechanism considers negotiation complete on the
    /// client side. Checked when the server announces completion: a server
    /// claiming completion while this is still false is a protocol
    /// violation.
    fn is_complete(&self) -> bool;

    /// Transform an outgoing payload before it is framed.
    fn wrap(&mut self, data: &[u8]) -> TransportResult<Vec<u8>>;

    /// Reverse [`wrap`](Self::wrap) on a received frame payload.
    fn unwrap_received(&mut self, data: &[u8]) -> TransportResult<Vec<u8>>;

    /// Release any resources held by the mechanism. Called on transport
    /// close, before the inner transport is closed.
    fn dispose(&mut self);
}
