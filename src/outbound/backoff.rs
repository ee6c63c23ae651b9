//! Back-off timing for outbound send retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for exponential back-off between send attempts.
///
/// The delay starts at `initial_delay`, doubles after every refused send and
/// is capped at `max_delay`. A successful send resets it.
///
/// # Default Values
/// - `initial_delay`: 10 milliseconds
/// - `max_delay`: 30 seconds
///
/// # Invariants
/// - `initial_delay` must not exceed `max_delay`
/// - `initial_delay` must be at least 1 millisecond
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first send attempt and after every success.
    pub initial_delay: Duration,
    /// Ceiling for the doubled delay.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl BackoffConfig {
    /// Clamp delays to sane bounds and ensure `initial_delay <= max_delay`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use packetlink::outbound::BackoffConfig;
    ///
    /// let cfg = BackoffConfig {
    ///     initial_delay: Duration::from_millis(5),
    ///     max_delay: Duration::ZERO,
    /// };
    ///
    /// let normalized = cfg.normalized();
    /// assert_eq!(normalized.initial_delay, Duration::from_millis(1));
    /// assert_eq!(normalized.max_delay, Duration::from_millis(5));
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.initial_delay = self.initial_delay.max(Duration::from_millis(1));
        self.max_delay = self.max_delay.max(Duration::from_millis(1));
        if self.initial_delay > self.max_delay {
            std::mem::swap(&mut self.initial_delay, &mut self.max_delay);
        }
        self
    }
}

/// Current position in the back-off sequence.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Backoff {
    config: BackoffConfig,
    current: Duration,
}

impl Backoff {
    pub(crate) fn new(config: BackoffConfig) -> Self {
        let config = config.normalized();
        Self {
            config,
            current: config.initial_delay,
        }
    }

    pub(crate) fn base(&self) -> Duration { self.config.initial_delay }

    pub(crate) fn current(&self) -> Duration { self.current }

    pub(crate) fn is_at_base(&self) -> bool { self.current <= self.config.initial_delay }

    pub(crate) fn reset(&mut self) { self.current = self.config.initial_delay; }

    /// Double the delay up to the ceiling and return it.
    pub(crate) fn escalate(&mut self) -> Duration {
        self.current = self.current.saturating_mul(2).min(self.config.max_delay);
        self.current
    }
}
