//! Transport wrapping factories.
//!
//! Servers that accept many connections configure one factory up front and
//! apply it to every raw transport they accept; clients usually wrap their
//! single transport directly and never touch this seam.

use crate::core::Transport;
use crate::transport::buffered::BufferedTransport;
use crate::transport::framed::FramedTransport;

/// Builds the configured wrapper around a freshly accepted transport.
pub trait TransportFactory<T: Transport> {
    /// The wrapped transport type this factory produces.
    type Output: Transport;

    /// Wrap `inner`.
    fn wrap(&self, inner: T) -> Self::Output;
}

/// Factory that returns the transport unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityFactory;

impl<T: Transport> TransportFactory<T> for IdentityFactory {
    type Output = T;

    fn wrap(&self, inner: T) -> T {
        inner
    }
}

/// Factory producing [`BufferedTransport`]s.
#[derive(Debug, Clone, Copy)]
pub struct BufferedFactory {
    buffer_size: usize,
}

impl BufferedFactory {
    /// Factory using `buffer_size` for every produced transport.
    pub fn new(buffer_size: usize) -> Self {
        Self { buffer_size }
    }
}

impl Default for BufferedFactory {
    fn default() -> Self {
        Self::new(crate::transport::DEFAULT_BUFFER_SIZE)
    }
}

impl<T: Transport> TransportFactory<T> for BufferedFactory {
    type Output = BufferedTransport<T>;

    fn wrap(&self, inner: T) -> Self::Output {
        BufferedTransport::with_buffer_size(inner, self.buffer_size)
    }
}

/// Factory producing [`FramedTransport`]s.
#[derive(Debug, Clone, Copy)]
pub struct FramedFactory {
    max_frame_size: usize,
}

impl FramedFactory {
    /// Factory using `max_frame_size` for every produced transport.
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }
}

impl Default for FramedFactory {
    fn default() -> Self {
        Self::new(crate::transport::DEFAULT_MAX_FRAME_SIZE)
    }
}

impl<T: Transport> TransportFactory<T> for FramedFactory {
    type Output = FramedTransport<T>;

    fn wrap(&self, inner: T) -> Self::Output {
        FramedTransport::with_max_frame_size(inner, self.max_frame_size)
    }
}
