//! Reading and writing batches of concatenated records.

use bytes::{Bytes, BytesMut};

use super::{Record, RecordError, RecordView, parse_at};

/// Iterator over the records of one batch.
///
/// Iteration stops at the zero-length terminator, at the end of the buffer,
/// or after yielding the first error.
#[derive(Clone, Debug)]
pub struct BatchReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    finished: bool,
}

impl<'a> BatchReader<'a> {
    /// Start reading records from the beginning of `buffer`.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            finished: false,
        }
    }
}

impl<'a> Iterator for BatchReader<'a> {
    type Item = Result<RecordView<'a>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.offset >= self.buffer.len() {
            self.finished = true;
            return None;
        }
        match parse_at(self.buffer, self.offset) {
            Ok(Some((view, len))) => {
                self.offset += len;
                Some(Ok(view))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Validate an entire batch and return its records in order.
///
/// Nothing is returned unless every record parses, so callers can never act
/// on a prefix of a corrupt batch.
///
/// # Errors
///
/// Returns the first [`RecordError`] encountered.
///
/// # Examples
///
/// ```
/// use packetlink::record::{RecordKind, split_batch};
///
/// let batch = [20, 0, 5, 0, 1, 21, 0, 4, 0, 0, 0, 0, 0];
/// let records = split_batch(&batch).expect("valid batch");
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].kind(), RecordKind::new(21));
/// ```
pub fn split_batch(buffer: &[u8]) -> Result<Vec<RecordView<'_>>, RecordError> {
    BatchReader::new(buffer).collect()
}

/// Concatenate encoded records into one batch buffer.
///
/// No terminator is appended; the batch ends at the end of the buffer.
pub fn encode_batch<'r>(records: impl IntoIterator<Item = &'r Record>) -> Bytes {
    let mut dst = BytesMut::new();
    for record in records {
        record.encode_into(&mut dst);
    }
    dst.freeze()
}
