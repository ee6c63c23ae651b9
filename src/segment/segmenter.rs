//! Outbound helper that splits an encoded message into segment records.

use std::num::NonZeroUsize;

use super::{SEGMENT_OVERHEAD, Segment};
use crate::record::{MAX_PAYLOAD_LEN, Record, RecordError};

/// Splits messages into segment records no larger than a send budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segmenter {
    max_chunk: NonZeroUsize,
}

impl Segmenter {
    /// Create a segmenter emitting chunks of at most `max_chunk` bytes.
    ///
    /// The chunk size is clamped so every segment fits a record.
    #[must_use]
    pub fn new(max_chunk: NonZeroUsize) -> Self {
        let ceiling = NonZeroUsize::new(MAX_PAYLOAD_LEN - 1).unwrap_or(NonZeroUsize::MIN);
        Self {
            max_chunk: max_chunk.min(ceiling),
        }
    }

    /// Create a segmenter whose records each fit `send_budget` bytes.
    ///
    /// Returns `None` when the budget cannot hold a segment header and at
    /// least one byte of chunk.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::segment::Segmenter;
    ///
    /// let segmenter = Segmenter::for_send_budget(16).expect("budget above overhead");
    /// assert_eq!(segmenter.max_chunk().get(), 11);
    /// assert!(Segmenter::for_send_budget(5).is_none());
    /// ```
    #[must_use]
    pub fn for_send_budget(send_budget: usize) -> Option<Self> {
        let chunk = send_budget.checked_sub(SEGMENT_OVERHEAD)?;
        NonZeroUsize::new(chunk).map(Self::new)
    }

    /// Largest chunk carried by one segment.
    #[must_use]
    pub const fn max_chunk(&self) -> NonZeroUsize { self.max_chunk }

    /// Split `message` into segment records in emission order.
    ///
    /// Only the last record carries the final flag. An empty message yields a
    /// single empty final segment.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if a segment cannot be encoded.
    pub fn segment(&self, message: &[u8]) -> Result<Vec<Record>, RecordError> {
        if message.is_empty() {
            return Ok(vec![Segment::new(true, &[]).to_record()?]);
        }
        let count = message.len().div_ceil(self.max_chunk.get());
        let mut records = Vec::with_capacity(count);
        for (index, chunk) in message.chunks(self.max_chunk.get()).enumerate() {
            records.push(Segment::new(index + 1 == count, chunk).to_record()?);
        }
        Ok(records)
    }
}
