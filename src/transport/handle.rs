//! Cloneable handle feeding a running transport.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::{TransportError, event::Event};
use crate::{deferred::DeferredRequest, outbound::SendFailure, record::Record};

/// Producer side of a [`Transport`](super::Transport).
///
/// The host's channel callbacks deliver inbound batches and send failures
/// through the handle; application code uses it to originate records and
/// deferred actions outside a dispatch.
#[derive(Clone, Debug)]
pub struct TransportHandle {
    tx: mpsc::Sender<Event>,
    communicated: Arc<AtomicBool>,
}

impl TransportHandle {
    pub(super) fn new(tx: mpsc::Sender<Event>, communicated: Arc<AtomicBool>) -> Self {
        Self { tx, communicated }
    }

    async fn send(&self, event: Event) -> Result<(), TransportError> {
        self.tx.send(event).await.map_err(|_| TransportError::Closed)
    }

    fn try_send(&self, event: Event) -> Result<(), TransportError> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Full,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    /// Deliver a batch received from the companion, waiting for queue space.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once the transport has stopped.
    pub async fn deliver_inbound(&self, batch: impl Into<Bytes>) -> Result<(), TransportError> {
        self.send(Event::Inbound(batch.into())).await
    }

    /// Deliver a received batch from a synchronous callback.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Full`] if the event queue is at capacity or
    /// [`TransportError::Closed`] once the transport has stopped.
    pub fn try_deliver_inbound(&self, batch: impl Into<Bytes>) -> Result<(), TransportError> {
        self.try_send(Event::Inbound(batch.into()))
    }

    /// Report a send failure the channel detected after accepting a batch.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Full`] if the event queue is at capacity or
    /// [`TransportError::Closed`] once the transport has stopped.
    pub fn report_send_failed(&self, failure: SendFailure) -> Result<(), TransportError> {
        self.try_send(Event::SendFailed(failure))
    }

    /// Queue a record for the companion.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once the transport has stopped.
    pub async fn enqueue_outbound(&self, record: Record) -> Result<(), TransportError> {
        self.send(Event::Outbound(record)).await
    }

    /// Request a deferred action.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once the transport has stopped.
    pub async fn request_deferred(
        &self,
        request: impl Into<DeferredRequest>,
    ) -> Result<(), TransportError> {
        self.send(Event::Deferred(request.into())).await
    }

    /// Whether the companion has been heard from since the link was last
    /// reported down.
    #[must_use]
    pub fn has_communicated(&self) -> bool { self.communicated.load(Ordering::Acquire) }
}
