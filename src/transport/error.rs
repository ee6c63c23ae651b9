//! Errors returned by [`TransportHandle`](super::TransportHandle).

use thiserror::Error;

/// Failure to hand work to a running transport.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The event queue was at capacity.
    #[error("transport event queue full")]
    Full,
    /// The transport has stopped and dropped its receiver.
    #[error("transport closed")]
    Closed,
}
