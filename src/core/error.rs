//! Error types for the transport stack.

use thiserror::Error;

/// Result alias used throughout the transport stack.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised by transport operations.
///
/// Transports never swallow errors from the transport they wrap; failures
/// propagate immediately. The one transformation the contract performs is in
/// [`Transport::read_all`](crate::core::Transport::read_all), which converts
/// a zero-length read into [`EndOfFile`](TransportError::EndOfFile) rather
/// than looping forever.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Operation attempted on a transport that is not open, or whose
    /// security negotiation failed.
    #[error("transport not open: {0}")]
    NotOpen(String),

    /// `open()` called on a transport that is already open.
    #[error("transport already open")]
    AlreadyOpen,

    /// The underlying I/O object reported a timeout.
    #[error("transport operation timed out")]
    TimedOut,

    /// The stream ended before a required byte count was satisfied.
    #[error("unexpected end of stream")]
    EndOfFile,

    /// A frame declared a negative length.
    #[error("negative frame size: {0}")]
    NegativeSize(i32),

    /// A frame declared a length above the configured ceiling.
    #[error("frame size {size} exceeds limit {limit}")]
    SizeLimit {
        /// Declared frame size.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// I/O error from an underlying stream object.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Any failure that fits no other category.
    #[error("unknown transport error: {0}")]
    Unknown(String),
}

impl TransportError {
    /// True if this error indicates the peer ended the stream.
    pub fn is_eof(&self) -> bool {
        matches!(self, TransportError::EndOfFile)
    }
}
