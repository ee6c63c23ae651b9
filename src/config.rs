//! Transport configuration.
//!
//! [`TransportConfig`] gathers the channel capacities and timing knobs the
//! transport needs. It is `serde`-friendly so hosts can load it alongside
//! their own settings; every field falls back to its default when omitted.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{deferred::RetryPolicy, outbound::BackoffConfig, segment::SEGMENT_OVERHEAD};

/// Errors reported by [`TransportConfig::validate`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A capacity that must hold at least one byte was zero.
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    /// The per-send budget cannot carry a segment with one byte of data.
    #[error("send budget of {budget} bytes cannot hold a segment (need at least {required})")]
    BudgetTooSmall { budget: usize, required: usize },
    /// The deferred retry interval was zero.
    #[error("deferred retry interval must be non-zero")]
    ZeroRetryInterval,
}

/// Settings for one [`Transport`](crate::transport::Transport) instance.
///
/// # Default Values
/// - `inbound_capacity`: 2044 bytes
/// - `outbound_capacity`: 1024 bytes
/// - `per_send_overhead`: 14 bytes
/// - `max_message_size`: 64 KiB
/// - `event_capacity`: 64 events
/// - `backoff`: [`BackoffConfig::default`]
/// - `scroll_retry`: [`RetryPolicy::default`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Largest inbound batch the channel delivers.
    pub inbound_capacity: usize,
    /// Largest outbound transmission the channel accepts.
    pub outbound_capacity: usize,
    /// Bytes the channel adds around every transmission.
    pub per_send_overhead: usize,
    /// Upper bound for a reassembled message.
    pub max_message_size: usize,
    /// Depth of the handle's event queue.
    pub event_capacity: usize,
    /// Send retry timing.
    pub backoff: BackoffConfig,
    /// Timing for blocked scroll requests.
    pub scroll_retry: RetryPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: 2044,
            outbound_capacity: 1024,
            per_send_overhead: 14,
            max_message_size: 64 * 1024,
            event_capacity: 64,
            backoff: BackoffConfig::default(),
            scroll_retry: RetryPolicy::default(),
        }
    }
}

impl TransportConfig {
    /// Bytes available for records in one transmission.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::config::TransportConfig;
    ///
    /// assert_eq!(TransportConfig::default().send_budget(), 1010);
    /// ```
    #[must_use]
    pub fn send_budget(&self) -> usize { self.outbound_capacity.saturating_sub(self.per_send_overhead) }

    /// Check that the configuration can drive a transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("inbound_capacity", self.inbound_capacity),
            ("outbound_capacity", self.outbound_capacity),
            ("max_message_size", self.max_message_size),
            ("event_capacity", self.event_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        let required = SEGMENT_OVERHEAD + 1;
        let budget = self.send_budget();
        if budget < required {
            return Err(ConfigError::BudgetTooSmall { budget, required });
        }
        if self.scroll_retry.interval == Duration::ZERO {
            return Err(ConfigError::ZeroRetryInterval);
        }
        Ok(())
    }
}
