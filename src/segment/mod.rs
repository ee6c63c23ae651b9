//! Segmentation and reassembly of messages larger than one transmission.
//!
//! A logical message that does not fit the channel's per-send budget travels
//! as a run of [`RecordKind::SEGMENT`](crate::record::RecordKind::SEGMENT)
//! records. Each segment payload starts with a one-byte final flag followed
//! by a raw chunk. Segments carry no sequence numbers: the channel preserves
//! emission order and only one message is in flight at a time.

pub mod error;
pub mod reassembler;
pub mod segmenter;

use bytes::{BufMut, BytesMut};

pub use error::ReassemblyError;
pub use reassembler::Reassembler;
pub use segmenter::Segmenter;

use crate::record::{HEADER_SIZE, Record, RecordError, RecordKind, RecordView};

/// Bytes a segment record spends before its chunk.
pub const SEGMENT_OVERHEAD: usize = HEADER_SIZE + 1;

/// Borrowed view of one segment record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    is_last: bool,
    chunk: &'a [u8],
}

impl<'a> Segment<'a> {
    /// Create a segment view from its parts.
    #[must_use]
    pub const fn new(is_last: bool, chunk: &'a [u8]) -> Self { Self { is_last, chunk } }

    /// Interpret a record as a segment.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::NotASegment`] for other kinds and
    /// [`ReassemblyError::MissingFlag`] when the payload is empty.
    pub fn from_view(view: &RecordView<'a>) -> Result<Self, ReassemblyError> {
        if view.kind() != RecordKind::SEGMENT {
            return Err(ReassemblyError::NotASegment(view.kind()));
        }
        let (flag, chunk) = view
            .payload()
            .split_first()
            .ok_or(ReassemblyError::MissingFlag)?;
        Ok(Self::new(*flag != 0, chunk))
    }

    /// Report whether this segment completes its message.
    #[must_use]
    pub const fn is_last(&self) -> bool { self.is_last }

    /// Raw chunk carried by the segment.
    #[must_use]
    pub const fn chunk(&self) -> &'a [u8] { self.chunk }

    /// Encode the segment as an owned record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::PayloadTooLarge`] if the chunk does not fit a
    /// record.
    pub fn to_record(&self) -> Result<Record, RecordError> {
        let mut payload = BytesMut::with_capacity(1 + self.chunk.len());
        payload.put_u8(u8::from(self.is_last));
        payload.put_slice(self.chunk);
        Record::new(RecordKind::SEGMENT, payload.freeze())
    }
}
