//! Builder assembling a [`Transport`] and its [`TransportHandle`].

use std::{
    num::NonZeroUsize,
    sync::{Arc, atomic::AtomicBool},
};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{Transport, TransportHandle, deadline::Deadline, slot::DeferredSlot};
use crate::{
    config::{ConfigError, TransportConfig},
    hooks::{NoopHooks, TransportHooks},
    outbound::{Channel, CoalescingQueue},
    router::Router,
    scroll::{NoScrollTarget, ScrollTarget},
    segment::{Reassembler, SEGMENT_OVERHEAD, Segmenter},
};

/// Builder for [`Transport`].
///
/// Only the channel is required. The router defaults to empty, the scroll
/// target to [`NoScrollTarget`], hooks to [`NoopHooks`] and the configuration
/// to [`TransportConfig::default`].
///
/// # Examples
///
/// ```
/// use packetlink::{
///     config::TransportConfig,
///     outbound::SendOutcome,
///     router::Router,
///     scroll::ScrollConsumer,
///     transport::TransportBuilder,
/// };
///
/// let (transport, handle) = TransportBuilder::new(|_: &[u8]| SendOutcome::Sent)
///     .config(TransportConfig {
///         outbound_capacity: 256,
///         ..TransportConfig::default()
///     })
///     .router(Router::new().route(ScrollConsumer::kinds(), ScrollConsumer))
///     .build()
///     .expect("valid configuration");
/// assert!(!handle.has_communicated());
/// # drop(transport);
/// ```
pub struct TransportBuilder {
    channel: Box<dyn Channel>,
    config: TransportConfig,
    router: Router,
    scroll_target: Box<dyn ScrollTarget>,
    hooks: Box<dyn TransportHooks>,
    shutdown: Option<CancellationToken>,
}

impl TransportBuilder {
    /// Start a builder sending through `channel`.
    pub fn new(channel: impl Channel + 'static) -> Self {
        Self {
            channel: Box::new(channel),
            config: TransportConfig::default(),
            router: Router::new(),
            scroll_target: Box::new(NoScrollTarget),
            hooks: Box::new(NoopHooks),
            shutdown: None,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self
    }

    /// Install the router dispatching inbound records.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Install the surface deferred scroll requests act on.
    #[must_use]
    pub fn scroll_target(mut self, target: impl ScrollTarget + 'static) -> Self {
        self.scroll_target = Box::new(target);
        self
    }

    /// Install host callbacks.
    #[must_use]
    pub fn hooks(mut self, hooks: impl TransportHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Share a shutdown token with other tasks. A fresh token is created
    /// otherwise.
    #[must_use]
    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Validate the configuration and build the transport and its handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if [`TransportConfig::validate`] rejects the
    /// configuration.
    pub fn build(self) -> Result<(Transport, TransportHandle), ConfigError> {
        let mut config = self.config;
        config.validate()?;
        config.backoff = config.backoff.normalized();

        let budget = config.send_budget();
        let segmenter = Segmenter::for_send_budget(budget).ok_or(ConfigError::BudgetTooSmall {
            budget,
            required: SEGMENT_OVERHEAD + 1,
        })?;
        let max_message_size =
            NonZeroUsize::new(config.max_message_size).ok_or(ConfigError::Zero {
                field: "max_message_size",
            })?;

        let (tx, events) = mpsc::channel(config.event_capacity);
        let communicated = Arc::new(AtomicBool::new(false));
        let transport = Transport {
            channel: self.channel,
            router: self.router,
            scroll_target: self.scroll_target,
            hooks: self.hooks,
            outbound: CoalescingQueue::new(budget, config.backoff),
            segmenter,
            reassembler: Reassembler::new(max_message_size),
            scroll: DeferredSlot::new(config.scroll_retry),
            send_timer: Deadline::default(),
            events,
            events_open: true,
            communicated: Arc::clone(&communicated),
            shutdown: self.shutdown.unwrap_or_default(),
            config,
        };
        Ok((transport, TransportHandle::new(tx, communicated)))
    }
}
