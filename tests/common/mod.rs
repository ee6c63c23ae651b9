//! Shared utilities for integration tests.
//!
//! Provides a recording consumer, channels that log what they are offered and
//! a record constructor.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::sync::{Arc, Mutex};

use packetlink::{
    Record,
    RecordKind,
    RecordView,
    outbound::SendOutcome,
    router::{Consumer, DispatchContext},
};

/// Records seen by a [`Recorder`] as `(kind, payload)` pairs.
pub type Seen = Arc<Mutex<Vec<(u16, Vec<u8>)>>>;

/// Batches offered to a channel built by [`flaky_channel`].
pub type Offered = Arc<Mutex<Vec<Vec<u8>>>>;

/// Consumer claiming every record it is offered.
pub struct Recorder(pub Seen);

impl Consumer for Recorder {
    fn handle(&mut self, record: &RecordView<'_>, _ctx: &mut DispatchContext) -> bool {
        self.0
            .lock()
            .expect("seen lock")
            .push((record.kind().get(), record.payload().to_vec()));
        true
    }
}

/// Build a record, panicking on oversize payloads.
pub fn record(kind: u16, payload: impl Into<Vec<u8>>) -> Record {
    Record::new(RecordKind::new(kind), payload.into()).expect("record fits u16 length")
}

/// Channel refusing every `busy_every`th attempt and passing accepted batches
/// to `deliver`.
pub fn flaky_channel<D>(
    busy_every: usize,
    offered: &Offered,
    mut deliver: D,
) -> impl FnMut(&[u8]) -> SendOutcome + Send + use<D>
where
    D: FnMut(&[u8]) -> SendOutcome + Send + 'static,
{
    let offered = Arc::clone(offered);
    let mut attempts = 0_usize;
    move |batch: &[u8]| {
        attempts += 1;
        offered.lock().expect("offered lock").push(batch.to_vec());
        if busy_every != 0 && attempts % busy_every == 0 {
            return SendOutcome::Busy;
        }
        deliver(batch)
    }
}
