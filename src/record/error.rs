//! Errors raised while framing or parsing records.

use thiserror::Error;

use super::HEADER_SIZE;

/// Malformed or unrepresentable record data.
///
/// Any of these conditions invalidates the whole batch being parsed. The
/// transport drops such batches and keeps listening.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Fewer bytes remain than a record header needs.
    #[error("truncated record header at offset {offset}: {remaining} bytes left, need {HEADER_SIZE}")]
    TruncatedHeader {
        /// Offset of the header within the batch.
        offset: usize,
        /// Bytes left in the batch.
        remaining: usize,
    },
    /// The declared length runs past the end of the buffer.
    #[error("record at offset {offset} declares {declared} bytes but only {remaining} remain")]
    LengthExceedsBuffer {
        /// Offset of the record within the batch.
        offset: usize,
        /// Length stored in the header.
        declared: usize,
        /// Bytes left in the batch.
        remaining: usize,
    },
    /// The declared length is non-zero yet smaller than the header itself.
    #[error("record at offset {offset} declares {declared} bytes, below the header size")]
    LengthBelowHeader {
        /// Offset of the record within the batch.
        offset: usize,
        /// Length stored in the header.
        declared: usize,
    },
    /// A payload is too large for the `u16` length field.
    #[error("payload of {len} bytes does not fit a record")]
    PayloadTooLarge {
        /// Payload length that was rejected.
        len: usize,
    },
}
