//! # Strata Transport
//!
//! A stack of composable byte-stream transports for RPC frameworks. Strata
//! sits between a raw connection (socket, file, or memory buffer) and the
//! message encoder/decoder above it, turning an unbuffered, unframed byte
//! stream into whichever combination the channel needs:
//!
//! - **Buffered**: coalesce small writes, amortize small reads
//! - **Framed**: length-prefixed message boundaries on a raw stream
//! - **Memory**: an in-process byte buffer behind the same contract
//! - **Secure**: challenge-response negotiation, then per-frame wrap/unwrap
//!
//! Every layer exposes the identical [`Transport`](crate::core::Transport) contract,
//! so upper layers stay transport-agnostic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Message Encoder / Decoder        │
//! ├─────────────────────────────────────────┤
//! │          Transport Stack                │  ← This crate
//! │   buffered / framed / secure / memory   │
//! ├─────────────────────────────────────────┤
//! │     Raw Connection (socket, file)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! All I/O is synchronous and blocking; the stack adds no threads and no
//! internal locking. One logical stream has one owner making sequential
//! calls. Timeouts and cancellation belong to the innermost raw transport.
//!
//! ## Feature Flags
//!
//! - `secure` (default): security-negotiated transport ([`secure`])
//!
//! ## Modules
//!
//! - [`core`]: Transport contract, error types, and the shared byte buffer
//! - [`transport`]: Concrete transports and wrappers
//! - [`secure`]: Security-negotiated transport (requires `secure` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use strata_transport::prelude::*;
//!
//! fn roundtrip() -> TransportResult<()> {
//!     let inner = MemoryTransport::new();
//!     let mut framed = FramedTransport::new(inner);
//!
//!     framed.write(b"ping")?;
//!     framed.flush()?;
//!
//!     // The frame we just flushed is readable back through the same
//!     // memory channel.
//!     let mut reply = [0u8; 4];
//!     framed.read_all(&mut reply)?;
//!     assert_eq!(&reply, b"ping");
//!     Ok(())
//! }
//! # roundtrip().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Concrete transports (always included)
pub mod transport;

// Security-negotiated transport (feature-gated)
#[cfg(feature = "secure")]
#[cfg_attr(docsrs, doc(cfg(feature = "secure")))]
pub mod secure;

/// Prelude module for convenient imports.
pub mod prelude {
    // Contract, errors, shared buffer
    pub use crate::core::*;

    // Concrete transports
    pub use crate::transport::{
        BufferedFactory, BufferedTransport, FramedFactory, FramedTransport, IdentityFactory,
        MemoryTransport, StreamTransport, TransportFactory,
    };

    // Security layer (when enabled)
    #[cfg(feature = "secure")]
    pub use crate::secure::{
        HandshakePhase, HandshakeStatus, PlainContext, SecureTransport, SecurityContext,
    };
}

// Re-export commonly used items at crate root
pub use crate::core::{ByteBuffer, RefillableTransport, Transport, TransportError, TransportResult};

pub use crate::transport::{BufferedTransport, FramedTransport, MemoryTransport, StreamTransport};

#[cfg(feature = "secure")]
pub use crate::secure::{SecureTransport, SecurityContext};
