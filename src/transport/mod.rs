//! Concrete transports and wrappers.
//!
//! This module provides every non-security layer of the stack:
//!
//! - [`MemoryTransport`]: in-memory byte buffer behind the contract
//! - [`BufferedTransport`]: write coalescing and read amortization
//! - [`FramedTransport`]: 4-byte big-endian length-prefixed messages
//! - [`StreamTransport`]: adapter over any `std::io` read/write object
//! - [`TransportFactory`]: wrapping seam for servers handling many
//!   connections
//!
//! Each wrapper owns the transport it wraps and exclusively owns its own
//! buffers. Bytes are delivered and framed in the exact order presented to
//! `write`/`flush`; nothing is reordered or coalesced across a flush
//! boundary.

mod buffered;
mod factory;
mod framed;
mod memory;
mod stream;

pub use buffered::{BufferedTransport, DEFAULT_BUFFER_SIZE};
pub use factory::{BufferedFactory, FramedFactory, IdentityFactory, TransportFactory};
pub use framed::{FramedTransport, DEFAULT_MAX_FRAME_SIZE};
pub use memory::MemoryTransport;
pub use stream::StreamTransport;
