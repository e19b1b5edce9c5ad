//! Handshake wire format and negotiation state machine.
//!
//! Handshake messages travel as a 5-byte header plus payload:
//!
//! ```text
//! +--------+------------------------+------------------------+
//! | Status | Length                 | Payload                |
//! | 1 byte | 4 bytes (BE, u32)      | exactly Length bytes   |
//! +--------+------------------------+------------------------+
//! ```
//!
//! Negotiation is modeled as an explicit state machine: [`HandshakePhase`]
//! enumerates where the exchange stands, and [`advance`] is a pure
//! transition function from a received message to the next phase and the
//! action to take. Every illegal transition is an exhaustively matched
//! error, never a fall-through.

use log::debug;

use crate::core::{TransportError, TransportResult};
use crate::secure::context::SecurityContext;

/// Size of the status-plus-length handshake message header.
pub const MESSAGE_HEADER_SIZE: usize = 5;

/// Status byte carried by each handshake message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandshakeStatus {
    /// Client announces the chosen mechanism.
    Start = 0x01,
    /// A token or challenge follows; negotiation continues.
    Ok = 0x02,
    /// The peer rejected the negotiation.
    Bad = 0x03,
    /// The peer failed internally during negotiation.
    Error = 0x04,
    /// The peer considers negotiation complete.
    Complete = 0x05,
}

impl HandshakeStatus {
    /// Parse a status from its wire byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Start),
            0x02 => Some(Self::Ok),
            0x03 => Some(Self::Bad),
            0x04 => Some(Self::Error),
            0x05 => Some(Self::Complete),
            _ => None,
        }
    }

    /// Convert the status to its wire byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Encode a handshake message: status byte, big-endian u32 payload length,
/// payload.
pub fn encode_message(status: HandshakeStatus, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(MESSAGE_HEADER_SIZE + payload.len());
    message.push(status.as_byte());
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

/// Where the negotiation stands.
///
/// Created at `Idle`; `Established` and `Failed` are terminal and never
/// re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    /// Negotiation has not started.
    Idle,
    /// The initial messages are sent; challenges are being exchanged.
    Negotiating,
    /// Negotiation succeeded; framed wrap/unwrap traffic may flow.
    Established,
    /// Negotiation failed; the transport is unusable.
    Failed,
}

/// What the transport must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeAction {
    /// Send an `Ok` message carrying this response, then keep receiving.
    Respond(Vec<u8>),
    /// Negotiation is done; switch to framed traffic.
    Establish,
}

/// Advance the negotiation by one received message.
///
/// Pure with respect to I/O: the caller receives the message and performs
/// the returned action. Any protocol violation (a message outside the
/// negotiating phase, a status that may not occur mid-exchange, or a server
/// claiming completion the context does not confirm) fails with
/// [`TransportError::NotOpen`].
pub fn advance<C: SecurityContext>(
    phase: HandshakePhase,
    status: HandshakeStatus,
    payload: &[u8],
    ctx: &mut C,
) -> TransportResult<(HandshakePhase, HandshakeAction)> {
    match phase {
        HandshakePhase::Negotiating => {}
        HandshakePhase::Idle => {
            return Err(TransportError::NotOpen(
                "handshake message received before negotiation started".into(),
            ));
        }
        HandshakePhase::Established | HandshakePhase::Failed => {
            return Err(TransportError::NotOpen(
                "handshake message received in a terminal phase".into(),
            ));
        }
    }

    match status {
        HandshakeStatus::Ok => {
            let response = ctx.process(payload)?;
            debug!(
                "handshake: challenge of {} bytes, responding with {} bytes",
                payload.len(),
                response.len()
            );
            Ok((HandshakePhase::Negotiating, HandshakeAction::Respond(response)))
        }
        HandshakeStatus::Complete => {
            if !ctx.is_complete() {
                return Err(TransportError::NotOpen(
                    "server erroneously indicated that negotiation was complete".into(),
                ));
            }
            debug!("handshake: established ({})", ctx.mechanism());
            Ok((HandshakePhase::Established, HandshakeAction::Establish))
        }
        HandshakeStatus::Start | HandshakeStatus::Bad | HandshakeStatus::Error => {
            Err(TransportError::NotOpen(format!(
                "bad negotiation status: {} ({})",
                status.as_byte(),
                String::from_utf8_lossy(payload)
            )))
        }
    }
}
