//! Inbound helper that stitches segments back into complete messages.
//!
//! Non-final chunks are copied into owned nodes kept newest-first. When the
//! final chunk arrives the message is rebuilt with a backward fill: the total
//! size is summed first, one buffer of exactly that size is allocated, and
//! chunks are written from the end of the buffer towards its start, final
//! chunk first, then the queue from its head (the chunk sent just before the
//! final one) to its tail (the first chunk sent). Walking newest-first while
//! filling back-to-front lands every chunk at its original offset without
//! reversing the queue or recording per-chunk offsets.

use std::{collections::VecDeque, num::NonZeroUsize};

use bytes::Bytes;
use log::debug;

use super::{ReassemblyError, Segment};

/// Single-message segment reassembler.
///
/// Only one logical message may be in flight. Segments of a second message
/// arriving before the first completes are not detected and corrupt both.
#[derive(Debug)]
pub struct Reassembler {
    max_message_size: NonZeroUsize,
    pending: VecDeque<Bytes>,
    buffered_bytes: usize,
    discarding: bool,
}

impl Reassembler {
    /// Create a reassembler that refuses messages above `max_message_size`.
    #[must_use]
    pub fn new(max_message_size: NonZeroUsize) -> Self {
        Self {
            max_message_size,
            pending: VecDeque::new(),
            buffered_bytes: 0,
            discarding: false,
        }
    }

    /// Feed one segment.
    ///
    /// Returns `Ok(Some(_))` with the assembled message when `segment` is the
    /// final one, `Ok(None)` while more segments are needed or when the
    /// message was discarded for exceeding the size cap.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::MessageTooLarge`] on the segment that pushes
    /// the message over the cap. Later segments of that message are ignored.
    pub fn accept(&mut self, segment: Segment<'_>) -> Result<Option<Vec<u8>>, ReassemblyError> {
        if segment.is_last() {
            self.accept_final_fragment(segment.chunk())
        } else {
            self.accept_fragment(segment.chunk()).map(|()| None)
        }
    }

    /// Copy a non-final chunk to the head of the reassembly queue.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::MessageTooLarge`] if the buffered message
    /// would exceed the cap; the partial message is dropped.
    pub fn accept_fragment(&mut self, chunk: &[u8]) -> Result<(), ReassemblyError> {
        if self.discarding {
            return Ok(());
        }
        let attempted = match self.checked_total(chunk.len()) {
            Ok(total) => total,
            Err(err) => {
                self.reset();
                self.discarding = true;
                return Err(err);
            }
        };
        self.pending.push_front(Bytes::copy_from_slice(chunk));
        self.buffered_bytes = attempted;
        Ok(())
    }

    /// Complete the message with its final chunk.
    ///
    /// Returns `Ok(None)` when the message had already been discarded; the
    /// reassembler is ready for the next message either way.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::MessageTooLarge`] if the final chunk pushes
    /// the message over the cap.
    pub fn accept_final_fragment(
        &mut self,
        chunk: &[u8],
    ) -> Result<Option<Vec<u8>>, ReassemblyError> {
        if self.discarding {
            debug!("final segment ends a discarded message");
            self.reset();
            return Ok(None);
        }
        let total = self.checked_total(chunk.len()).inspect_err(|_| self.reset())?;
        let mut buffer = vec![0_u8; total];
        let mut cursor = total;

        cursor -= chunk.len();
        buffer[cursor..].copy_from_slice(chunk);
        while let Some(node) = self.pending.pop_front() {
            let start = cursor - node.len();
            buffer[start..cursor].copy_from_slice(&node);
            cursor = start;
        }
        debug_assert_eq!(cursor, 0, "backward fill must end at the buffer start");

        self.reset();
        Ok(Some(buffer))
    }

    /// Number of non-final chunks currently buffered.
    #[must_use]
    pub fn buffered_len(&self) -> usize { self.pending.len() }

    /// Bytes currently buffered across all pending chunks.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize { self.buffered_bytes }

    /// Report whether the current message is being skipped.
    #[must_use]
    pub fn is_discarding(&self) -> bool { self.discarding }

    fn checked_total(&self, additional: usize) -> Result<usize, ReassemblyError> {
        let limit = self.max_message_size;
        match self.buffered_bytes.checked_add(additional) {
            Some(total) if total <= limit.get() => Ok(total),
            attempted => Err(ReassemblyError::MessageTooLarge {
                attempted: attempted.unwrap_or(usize::MAX),
                limit,
            }),
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.buffered_bytes = 0;
        self.discarding = false;
    }
}
