//! Event types for the transport select loop.

use bytes::Bytes;

use crate::{deferred::DeferredRequest, outbound::SendFailure, record::Record};

/// Work delivered to the transport through a
/// [`TransportHandle`](super::TransportHandle).
#[derive(Debug)]
pub(super) enum Event {
    /// A batch received from the companion.
    Inbound(Bytes),
    /// The channel reported an asynchronous send failure.
    SendFailed(SendFailure),
    /// A record produced outside a dispatch.
    Outbound(Record),
    /// A deferred action requested outside a dispatch.
    Deferred(DeferredRequest),
}

/// What woke the transport select loop.
#[derive(Debug)]
pub(super) enum Wake {
    Shutdown,
    SendTimer,
    ScrollRetry,
    /// `None` once every handle has been dropped.
    Event(Option<Event>),
}
