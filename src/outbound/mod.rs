//! Outbound queue that coalesces records into transport-sized batches.
//!
//! Producers hand over owned [`Record`]s. When the send timer fires the queue
//! moves as many records from its head as fit the per-send budget into one
//! [`Batch`] and offers it to the [`Channel`]. A refused batch is kept
//! verbatim for the next attempt while the delay doubles; it is never split
//! or merged with later records. Each record therefore lives in exactly one
//! place: the FIFO, the in-flight batch, or the channel.

mod backoff;
mod channel;
mod error;

use std::{collections::VecDeque, time::Duration};

pub use backoff::BackoffConfig;
use backoff::Backoff;
use bytes::{Bytes, BytesMut};
pub use channel::{Channel, SendFailure, SendOutcome};
pub use error::OutboundError;
use log::debug;

use crate::{metrics, record::Record, timer::TimerCommand};

/// Records coalesced into one transmission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    bytes: Bytes,
    records: usize,
}

impl Batch {
    /// Encoded batch as handed to the channel.
    #[must_use]
    pub fn bytes(&self) -> &[u8] { &self.bytes }

    /// Number of records in the batch.
    #[must_use]
    pub const fn records(&self) -> usize { self.records }

    /// Encoded size in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Report whether the batch holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }
}

/// FIFO of outbound records with coalescing and exponential back-off.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use packetlink::{
///     outbound::{BackoffConfig, CoalescingQueue, SendOutcome},
///     record::{Record, RecordKind},
///     timer::TimerCommand,
/// };
///
/// let mut queue = CoalescingQueue::new(64, BackoffConfig::default());
/// let record = Record::new(RecordKind::new(20), vec![1, 2]).expect("small record");
/// assert_eq!(
///     queue.enqueue(record).expect("fits budget"),
///     TimerCommand::Arm(Duration::from_millis(10))
/// );
///
/// let mut sent = Vec::new();
/// let mut channel = |batch: &[u8]| {
///     sent.push(batch.to_vec());
///     SendOutcome::Sent
/// };
/// assert_eq!(queue.on_timer_fire(&mut channel), TimerCommand::Cancel);
/// assert_eq!(sent, vec![vec![20, 0, 6, 0, 1, 2]]);
/// ```
#[derive(Debug)]
pub struct CoalescingQueue {
    fifo: VecDeque<Record>,
    in_flight: Option<Batch>,
    backoff: Backoff,
    timer_armed: bool,
    send_budget: usize,
}

impl CoalescingQueue {
    /// Create an empty queue sending at most `send_budget` bytes per batch.
    #[must_use]
    pub fn new(send_budget: usize, backoff: BackoffConfig) -> Self {
        Self {
            fifo: VecDeque::new(),
            in_flight: None,
            backoff: Backoff::new(backoff),
            timer_armed: false,
            send_budget,
        }
    }

    /// Take ownership of `record` and append it to the FIFO.
    ///
    /// Returns [`TimerCommand::Arm`] with the base delay when the queue was
    /// idle, otherwise [`TimerCommand::Keep`] so the running retry cycle picks
    /// the record up.
    ///
    /// # Errors
    ///
    /// Returns [`OutboundError::RecordTooLarge`] if the record alone exceeds
    /// the send budget. Such records must be segmented first.
    pub fn enqueue(&mut self, record: Record) -> Result<TimerCommand, OutboundError> {
        let len = record.encoded_len();
        if len > self.send_budget {
            return Err(OutboundError::RecordTooLarge {
                len,
                budget: self.send_budget,
            });
        }
        self.fifo.push_back(record);
        metrics::set_outbound_depth(self.fifo.len());
        if !self.timer_armed && self.backoff.is_at_base() {
            return Ok(self.arm(self.backoff.base()));
        }
        Ok(TimerCommand::Keep)
    }

    /// Run one send attempt.
    ///
    /// Builds a batch from the FIFO head unless a refused batch is still
    /// pending, then offers it to `channel`.
    pub fn on_timer_fire<C: Channel + ?Sized>(&mut self, channel: &mut C) -> TimerCommand {
        self.timer_armed = false;
        if self.in_flight.is_none() {
            self.in_flight = self.coalesce();
        }
        let Some(batch) = self.in_flight.as_ref() else {
            return TimerCommand::Cancel;
        };

        match channel.send(batch.bytes()) {
            SendOutcome::Sent => {
                debug!(
                    "batch sent: records={}, bytes={}",
                    batch.records(),
                    batch.len()
                );
                metrics::inc_batches_sent(batch.records());
                self.in_flight = None;
                self.backoff.reset();
                if self.fifo.is_empty() {
                    TimerCommand::Cancel
                } else {
                    self.arm(self.backoff.base())
                }
            }
            SendOutcome::Busy => {
                let delay = self.backoff.escalate();
                debug!(
                    "channel busy, retrying batch: records={}, delay_ms={}",
                    batch.records(),
                    delay.as_millis()
                );
                metrics::inc_send_retries();
                self.arm(delay)
            }
        }
    }

    /// Records waiting in the FIFO, excluding the in-flight batch.
    #[must_use]
    pub fn len(&self) -> usize { self.fifo.len() }

    /// Report whether the FIFO is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.fifo.is_empty() }

    /// Report whether nothing remains to send.
    #[must_use]
    pub fn is_idle(&self) -> bool { self.fifo.is_empty() && self.in_flight.is_none() }

    /// Batch awaiting a retry, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<&Batch> { self.in_flight.as_ref() }

    /// Delay used for the next arming of the timer.
    #[must_use]
    pub fn current_delay(&self) -> Duration { self.backoff.current() }

    /// Per-send byte budget.
    #[must_use]
    pub const fn send_budget(&self) -> usize { self.send_budget }

    fn arm(&mut self, delay: Duration) -> TimerCommand {
        self.timer_armed = true;
        TimerCommand::Arm(delay)
    }

    fn coalesce(&mut self) -> Option<Batch> {
        let mut dst = BytesMut::new();
        let mut records = 0;
        while self
            .fifo
            .front()
            .is_some_and(|next| dst.len() + next.encoded_len() <= self.send_budget)
        {
            let Some(record) = self.fifo.pop_front() else {
                break;
            };
            record.encode_into(&mut dst);
            records += 1;
        }
        metrics::set_outbound_depth(self.fifo.len());
        (records > 0).then(|| Batch {
            bytes: dst.freeze(),
            records,
        })
    }
}

#[cfg(test)]
mod tests;
