//! Metric helpers for `packetlink`.
//!
//! This module defines metric names and small helpers wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the counter tracking records handed to consumers or queued for
/// sending.
pub const RECORDS_PROCESSED: &str = "packetlink_records_processed_total";
/// Name of the counter tracking batches accepted by the channel.
pub const BATCHES_SENT: &str = "packetlink_batches_sent_total";
/// Name of the counter tracking refused send attempts.
pub const SEND_RETRIES: &str = "packetlink_send_retries_total";
/// Name of the counter tracking inbound batches dropped as malformed.
pub const BATCHES_DROPPED: &str = "packetlink_batches_dropped_total";
/// Name of the counter tracking deferred actions abandoned after retries.
pub const DEFERRED_ABANDONED: &str = "packetlink_deferred_abandoned_total";
/// Name of the gauge tracking records waiting in the outbound FIFO.
pub const OUTBOUND_DEPTH: &str = "packetlink_outbound_queue_depth";

/// Direction of record processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Records received from the companion.
    Inbound,
    /// Records queued for the companion.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a processed record for the given direction.
pub fn inc_records(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(RECORDS_PROCESSED, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a batch accepted by the channel carrying `records` records.
pub fn inc_batches_sent(records: usize) {
    #[cfg(feature = "metrics")]
    {
        counter!(BATCHES_SENT).increment(1);
        counter!(RECORDS_PROCESSED, "direction" => Direction::Outbound.as_str())
            .increment(u64::try_from(records).unwrap_or(u64::MAX));
    }
    #[cfg(not(feature = "metrics"))]
    let _ = records;
}

/// Record a send attempt refused by the channel.
pub fn inc_send_retries() {
    #[cfg(feature = "metrics")]
    counter!(SEND_RETRIES).increment(1);
}

/// Record an inbound batch dropped as malformed.
pub fn inc_batches_dropped() {
    #[cfg(feature = "metrics")]
    counter!(BATCHES_DROPPED).increment(1);
}

/// Record a deferred action abandoned after exhausting its retries.
pub fn inc_deferred_abandoned() {
    #[cfg(feature = "metrics")]
    counter!(DEFERRED_ABANDONED).increment(1);
}

/// Publish the current outbound FIFO depth.
pub fn set_outbound_depth(depth: usize) {
    #[cfg(feature = "metrics")]
    #[expect(
        clippy::cast_precision_loss,
        reason = "queue depths stay far below f64 precision limits"
    )]
    gauge!(OUTBOUND_DEPTH).set(depth as f64);
    #[cfg(not(feature = "metrics"))]
    let _ = depth;
}
