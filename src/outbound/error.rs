//! Errors returned by the outbound queue.

use thiserror::Error;

/// Records the coalescing queue refuses to own.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum OutboundError {
    /// The record alone exceeds the per-send budget and must be segmented.
    #[error("record of {len} bytes exceeds the {budget}-byte send budget")]
    RecordTooLarge {
        /// Encoded record length.
        len: usize,
        /// Per-send byte budget.
        budget: usize,
    },
}
