//! Errors raised while reassembling segmented messages.

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::record::RecordKind;

/// Failures observed by the [`Reassembler`](super::Reassembler).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// The record handed to the reassembler is not a segment.
    #[error("record of kind {0} is not a segment")]
    NotASegment(RecordKind),
    /// A segment record carried no final flag.
    #[error("segment record is missing its final flag")]
    MissingFlag,
    /// The message outgrew the configured cap and is being discarded.
    #[error("reassembled message would reach {attempted} bytes, above the {limit}-byte limit")]
    MessageTooLarge {
        /// Size the message would have reached.
        attempted: usize,
        /// Configured maximum message size.
        limit: NonZeroUsize,
    },
}
