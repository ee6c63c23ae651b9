//! Transport actor tying the codec, reassembly, dispatch and outbound queue
//! together.
//!
//! [`Transport::run`] owns every buffer, queue and pending action and handles
//! one event at a time in a `biased` `tokio::select!` loop: shutdown first,
//! then the send timer, the deferred retry timer and finally events delivered
//! through a [`TransportHandle`]. The state machines underneath report timer
//! changes as [`TimerCommand`](crate::timer::TimerCommand)s, which the actor
//! turns into deadlines.
//!
//! Hosts with their own event loop can skip `run` and call the `on_*`
//! operations directly.

mod builder;
mod deadline;
mod error;
mod event;
mod handle;
mod slot;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

pub use builder::TransportBuilder;
use deadline::Deadline;
pub use error::TransportError;
use event::{Event, Wake};
pub use handle::TransportHandle;
use slot::DeferredSlot;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::TransportConfig,
    deferred::DeferredRequest,
    hooks::TransportHooks,
    metrics::{self, Direction},
    outbound::{Channel, CoalescingQueue, SendFailure},
    record::{Record, RecordKind, RecordView, split_batch},
    router::{DispatchContext, Router},
    scroll::{ScrollTarget, ScrollTo},
    segment::{Reassembler, Segment, Segmenter},
};

/// Packet transport for one companion link.
///
/// Built with [`TransportBuilder`]; see there for an example.
pub struct Transport {
    channel: Box<dyn Channel>,
    router: Router,
    scroll_target: Box<dyn ScrollTarget>,
    hooks: Box<dyn TransportHooks>,
    config: TransportConfig,
    outbound: CoalescingQueue,
    segmenter: Segmenter,
    reassembler: Reassembler,
    scroll: DeferredSlot<ScrollTo>,
    send_timer: Deadline,
    events: mpsc::Receiver<Event>,
    events_open: bool,
    communicated: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl Transport {
    /// Drive the transport until shutdown, or until every handle is dropped
    /// and all queued work has drained.
    ///
    /// Records still waiting for a busy channel keep the loop alive; cancel
    /// the shutdown token to abandon them.
    pub async fn run(&mut self) {
        if self.shutdown.is_cancelled() {
            info!("transport shut down before start");
            return;
        }
        info!(send_budget = self.outbound.send_budget(), "transport started");
        loop {
            if !self.events_open && self.is_drained() {
                info!("transport drained after handles closed");
                return;
            }
            match self.next_wake().await {
                Wake::Shutdown => {
                    info!(
                        pending_records = self.outbound.len(),
                        "transport shut down"
                    );
                    return;
                }
                Wake::SendTimer => self.on_send_timer_fire(),
                Wake::ScrollRetry => self.on_scroll_retry_fire(),
                Wake::Event(Some(event)) => self.handle_event(event),
                Wake::Event(None) => self.events_open = false,
            }
        }
    }

    /// Await the next ready source in priority order.
    async fn next_wake(&mut self) -> Wake {
        let send_timer = self.send_timer;
        let scroll_timer = self.scroll.deadline();
        tokio::select! {
            biased;

            () = self.shutdown.cancelled() => Wake::Shutdown,
            () = send_timer.expired(), if send_timer.is_armed() => Wake::SendTimer,
            () = scroll_timer.expired(), if scroll_timer.is_armed() => Wake::ScrollRetry,
            event = self.events.recv(), if self.events_open => Wake::Event(event),
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Inbound(batch) => self.on_inbound_batch(&batch),
            Event::SendFailed(failure) => self.on_send_failed(failure),
            Event::Outbound(record) => self.enqueue_outbound(record),
            Event::Deferred(request) => self.request_deferred(request),
        }
    }

    fn is_drained(&self) -> bool {
        self.outbound.is_idle()
            && !self.send_timer.is_armed()
            && !self.scroll.deadline().is_armed()
    }

    /// Process one batch received from the companion.
    ///
    /// The batch is validated as a whole before any record is dispatched.
    /// Segment records feed the reassembler; every other record goes to the
    /// router in arrival order.
    pub fn on_inbound_batch(&mut self, batch: &[u8]) {
        self.communicated.store(true, Ordering::Release);
        if batch.len() > self.config.inbound_capacity {
            warn!(
                len = batch.len(),
                capacity = self.config.inbound_capacity,
                "dropping inbound batch larger than channel capacity"
            );
            metrics::inc_batches_dropped();
            return;
        }
        let records = match split_batch(batch) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, len = batch.len(), "dropping malformed inbound batch");
                metrics::inc_batches_dropped();
                return;
            }
        };
        for record in &records {
            if record.kind() == RecordKind::SEGMENT {
                self.accept_segment(record);
            } else {
                self.dispatch(record);
            }
        }
    }

    fn accept_segment(&mut self, record: &RecordView<'_>) {
        let segment = match Segment::from_view(record) {
            Ok(segment) => segment,
            Err(e) => {
                warn!(error = %e, "ignoring malformed segment");
                return;
            }
        };
        match self.reassembler.accept(segment) {
            Ok(Some(message)) => self.dispatch_message(&message),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "discarding inbound message"),
        }
    }

    /// Split a reassembled message and dispatch its records.
    fn dispatch_message(&mut self, message: &[u8]) {
        let records = match split_batch(message) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, len = message.len(), "dropping malformed reassembled message");
                metrics::inc_batches_dropped();
                return;
            }
        };
        debug!(len = message.len(), records = records.len(), "message reassembled");
        for record in &records {
            if record.kind() == RecordKind::SEGMENT {
                debug!("ignoring segment nested in a reassembled message");
                continue;
            }
            self.dispatch(record);
        }
    }

    fn dispatch(&mut self, record: &RecordView<'_>) {
        metrics::inc_records(Direction::Inbound);
        let mut ctx = DispatchContext::new();
        if !self.router.dispatch(record, &mut ctx) {
            debug!(kind = %record.kind(), "no consumer claimed record");
            self.hooks.on_unhandled_record(record.kind());
        }
        for outbound in ctx.take_outbound() {
            self.enqueue_outbound(outbound);
        }
        for request in ctx.take_deferred() {
            self.request_deferred(request);
        }
    }

    /// Queue a record for the companion, segmenting it when it exceeds the
    /// per-send budget.
    pub fn enqueue_outbound(&mut self, record: Record) {
        if record.encoded_len() <= self.outbound.send_budget() {
            self.push_outbound(record);
            return;
        }
        let message = record.to_bytes();
        match self.segmenter.segment(&message) {
            Ok(segments) => {
                debug!(
                    kind = %record.kind(),
                    len = message.len(),
                    segments = segments.len(),
                    "segmenting outbound record"
                );
                for segment in segments {
                    self.push_outbound(segment);
                }
            }
            Err(e) => warn!(error = %e, kind = %record.kind(), "dropping outbound record"),
        }
    }

    fn push_outbound(&mut self, record: Record) {
        match self.outbound.enqueue(record) {
            Ok(command) => self.send_timer.apply(command),
            Err(e) => warn!(error = %e, "dropping outbound record"),
        }
    }

    /// Run one send attempt. Called when the send timer expires.
    pub fn on_send_timer_fire(&mut self) {
        self.send_timer.clear();
        let command = self.outbound.on_timer_fire(&mut *self.channel);
        self.send_timer.apply(command);
    }

    /// React to a failure the channel reported after accepting a batch.
    ///
    /// The batch is not requeued.
    pub fn on_send_failed(&mut self, failure: SendFailure) {
        if failure.is_connectivity_loss() {
            warn!("companion not connected");
            self.communicated.store(false, Ordering::Release);
            self.hooks.on_connectivity_lost();
        } else {
            debug!(?failure, "send failed after acceptance");
        }
    }

    /// Apply a deferred action now or park it for retry.
    pub fn request_deferred(&mut self, request: DeferredRequest) {
        match request {
            DeferredRequest::Scroll(scroll) => {
                self.scroll.request(scroll, &mut *self.scroll_target);
            }
        }
    }

    /// Re-check a parked scroll request. Called when the scroll retry timer
    /// expires.
    pub fn on_scroll_retry_fire(&mut self) { self.scroll.on_timer_fire(&mut *self.scroll_target); }

    /// Whether the companion has been heard from since the link was last
    /// reported down.
    #[must_use]
    pub fn has_communicated(&self) -> bool { self.communicated.load(Ordering::Acquire) }

    /// Outbound queue state.
    #[must_use]
    pub fn outbound(&self) -> &CoalescingQueue { &self.outbound }

    /// Scroll request waiting for the foreground, if any.
    #[must_use]
    pub fn pending_scroll(&self) -> Option<&ScrollTo> { self.scroll.pending() }

    /// Token that stops [`Transport::run`] when cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken { self.shutdown.clone() }
}
