//! Binary framing of typed, length-prefixed records.
//!
//! Every record starts with a four-byte header: the kind tag followed by the
//! total record length (header included), both little-endian `u16`. A batch
//! is a plain concatenation of records, ended either by the end of the buffer
//! or by a record whose length field is zero.
//!
//! Parsing never allocates. [`RecordView`] borrows from the received buffer;
//! [`Record`] owns its payload and is what producers hand to the outbound
//! queue.

pub mod batch;
pub mod error;
pub mod kind;

use bytes::{BufMut, Bytes, BytesMut};

pub use batch::{BatchReader, encode_batch, split_batch};
pub use error::RecordError;
pub use kind::RecordKind;

use crate::byte_order::{field, read_wire_u16, write_wire_u16};

/// Size of the kind and length fields preceding every payload.
pub const HEADER_SIZE: usize = 4;

/// Largest encoded record, bounded by the `u16` length field.
pub const MAX_RECORD_LEN: usize = u16::MAX as usize;

/// Largest payload a single record can carry.
pub const MAX_PAYLOAD_LEN: usize = MAX_RECORD_LEN - HEADER_SIZE;

/// Borrowed view of one record inside a received buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordView<'a> {
    kind: RecordKind,
    payload: &'a [u8],
}

impl<'a> RecordView<'a> {
    /// Build a view over an already validated payload.
    #[must_use]
    pub const fn new(kind: RecordKind, payload: &'a [u8]) -> Self { Self { kind, payload } }

    /// Kind tag of the record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind { self.kind }

    /// Payload bytes following the header.
    #[must_use]
    pub const fn payload(&self) -> &'a [u8] { self.payload }

    /// Encoded length including the header.
    #[must_use]
    pub const fn total_len(&self) -> usize { HEADER_SIZE + self.payload.len() }

    /// Copy the view into an owned [`Record`].
    #[must_use]
    pub fn to_record(&self) -> Record {
        Record {
            kind: self.kind,
            payload: Bytes::copy_from_slice(self.payload),
        }
    }
}

/// Owned record ready to be queued for transmission.
///
/// Construction checks that the encoded form fits the length field, so every
/// `Record` can be serialised without further validation.
///
/// # Examples
///
/// ```
/// use packetlink::record::{Record, RecordKind};
///
/// let record = Record::new(RecordKind::new(20), vec![1, 2, 3]).expect("small payload");
/// assert_eq!(record.encoded_len(), 7);
/// assert_eq!(record.to_bytes().as_ref(), &[20, 0, 7, 0, 1, 2, 3]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    payload: Bytes,
}

impl Record {
    /// Create a record, taking ownership of `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::PayloadTooLarge`] if the encoded record would
    /// not fit the `u16` length field.
    pub fn new(kind: RecordKind, payload: impl Into<Bytes>) -> Result<Self, RecordError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(RecordError::PayloadTooLarge { len: payload.len() });
        }
        Ok(Self { kind, payload })
    }

    /// Kind tag of the record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind { self.kind }

    /// Borrow the payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Encoded length including the header.
    #[must_use]
    pub fn encoded_len(&self) -> usize { HEADER_SIZE + self.payload.len() }

    /// Borrow the record as a [`RecordView`].
    #[must_use]
    pub fn view(&self) -> RecordView<'_> { RecordView::new(self.kind, &self.payload) }

    /// Append the encoded record to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        // Bounded by `MAX_RECORD_LEN` at construction.
        let total = u16::try_from(self.encoded_len()).unwrap_or(u16::MAX);
        dst.reserve(self.encoded_len());
        dst.put_slice(&write_wire_u16(self.kind.get()));
        dst.put_slice(&write_wire_u16(total));
        dst.put_slice(&self.payload);
    }

    /// Encode the record into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut dst);
        dst.freeze()
    }
}

/// Parse the record at the start of `buffer`.
///
/// Returns `Ok(None)` for the zero-length terminator.
///
/// # Errors
///
/// Returns [`RecordError`] if the header is truncated or the declared length
/// is inconsistent with the buffer.
///
/// # Examples
///
/// ```
/// use packetlink::record::{RecordKind, parse};
///
/// let view = parse(&[7, 0, 6, 0, 0xaa, 0xbb])
///     .expect("well formed")
///     .expect("not a terminator");
/// assert_eq!(view.kind(), RecordKind::new(7));
/// assert_eq!(view.payload(), &[0xaa, 0xbb]);
///
/// assert!(parse(&[7, 0, 9, 0, 0xaa]).is_err());
/// ```
pub fn parse(buffer: &[u8]) -> Result<Option<RecordView<'_>>, RecordError> {
    parse_at(buffer, 0).map(|parsed| parsed.map(|(view, _)| view))
}

/// Serialise `kind` and `payload` into a header-prefixed buffer.
///
/// # Errors
///
/// Returns [`RecordError::PayloadTooLarge`] if the record would not fit the
/// length field.
pub fn serialize(kind: RecordKind, payload: &[u8]) -> Result<Bytes, RecordError> {
    Record::new(kind, Bytes::copy_from_slice(payload)).map(|record| record.to_bytes())
}

/// Parse the record starting at `offset`, returning it with its encoded
/// length.
pub(crate) fn parse_at(
    buffer: &[u8],
    offset: usize,
) -> Result<Option<(RecordView<'_>, usize)>, RecordError> {
    let rest = buffer.get(offset..).unwrap_or_default();
    let (Some(kind), Some(declared)) = (field::<2>(rest, 0), field::<2>(rest, 2)) else {
        return Err(RecordError::TruncatedHeader {
            offset,
            remaining: rest.len(),
        });
    };
    let declared = usize::from(read_wire_u16(declared));
    if declared == 0 {
        return Ok(None);
    }
    if declared < HEADER_SIZE {
        return Err(RecordError::LengthBelowHeader { offset, declared });
    }
    if declared > rest.len() {
        return Err(RecordError::LengthExceedsBuffer {
            offset,
            declared,
            remaining: rest.len(),
        });
    }
    let view = RecordView::new(
        RecordKind::new(read_wire_u16(kind)),
        &rest[HEADER_SIZE..declared],
    );
    Ok(Some((view, declared)))
}
