//! Core contract for the transport stack.
//!
//! Everything here is shared by every concrete transport:
//!
//! - [`TransportError`] / [`TransportResult`]: the error taxonomy
//! - [`Transport`]: the byte-stream contract all layers implement
//! - [`RefillableTransport`]: optional direct-buffer capability
//! - [`ByteBuffer`]: the reusable position-tracked buffer behind every layer

mod buffer;
mod error;
mod traits;

pub use buffer::ByteBuffer;
pub use error::{TransportError, TransportResult};
pub use traits::{RefillableTransport, Transport};
