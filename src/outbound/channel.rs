//! Boundary with the host's send primitive.

/// Result of a single synchronous send attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The channel accepted the batch.
    Sent,
    /// The channel refused the batch for now; retry later.
    Busy,
}

/// Reason reported when the host fails a send after accepting it.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendFailure {
    /// The peer is not reachable at all.
    NotConnected,
    /// The peer did not acknowledge in time.
    Timeout,
    /// The peer refused the transmission.
    Rejected,
}

impl SendFailure {
    /// Report whether the failure means the peer has gone away.
    #[must_use]
    pub const fn is_connectivity_loss(self) -> bool { matches!(self, Self::NotConnected) }
}

/// Host primitive transmitting one batch per call.
///
/// Implementations make at most one attempt and report synchronously whether
/// the batch was taken. Closures of the form `FnMut(&[u8]) -> SendOutcome`
/// implement the trait directly.
pub trait Channel: Send {
    /// Attempt to transmit `batch`.
    fn send(&mut self, batch: &[u8]) -> SendOutcome;
}

impl<F> Channel for F
where
    F: FnMut(&[u8]) -> SendOutcome + Send,
{
    fn send(&mut self, batch: &[u8]) -> SendOutcome { self(batch) }
}
