//! Retry-until-possible handling for actions blocked by transient host state.
//!
//! Some UI actions target a surface that a host overlay may temporarily
//! cover. [`DeferredRetry`] tries such an action immediately and, if the
//! target is unreachable, keeps exactly one pending instance per action class
//! and re-checks it on a fixed interval. A newer request supersedes the
//! pending one. After [`RetryPolicy::max_retries`] failed checks the action
//! is dropped without surfacing an error.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{metrics, scroll::ScrollTo, timer::TimerCommand};

/// Deferred action requested by a consumer, tagged by action class.
///
/// The transport keeps one [`DeferredRetry`] slot per variant.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredRequest {
    /// Move the scroll position of the foreground window.
    Scroll(ScrollTo),
}

impl From<ScrollTo> for DeferredRequest {
    fn from(scroll: ScrollTo) -> Self { Self::Scroll(scroll) }
}

/// Outcome of one attempt to apply a deferred action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// The action took effect, or no longer applies to the current surface.
    Applied,
    /// The target surface is unreachable right now.
    Blocked,
}

/// An action that may have to wait for the foreground to become reachable.
pub trait DeferredAction {
    /// Collaborator the action is applied to.
    type Target: ?Sized;

    /// Try to apply the action against the current foreground.
    fn attempt(&self, target: &mut Self::Target) -> Attempt;
}

/// Timing for re-checking a blocked action.
///
/// # Default Values
/// - `interval`: 100 milliseconds
/// - `max_retries`: 50 (five seconds in total)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Fixed delay between checks.
    pub interval: Duration,
    /// Failed checks after which the action is abandoned.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_retries: 50,
        }
    }
}

#[derive(Debug)]
struct Pending<A> {
    action: A,
    retries: u32,
}

/// Single-slot deferred retry for one action class.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use packetlink::{
///     deferred::{Attempt, DeferredAction, DeferredRetry, RetryPolicy},
///     timer::TimerCommand,
/// };
///
/// struct Brightness(u8);
///
/// impl DeferredAction for Brightness {
///     type Target = Option<u8>;
///
///     fn attempt(&self, target: &mut Option<u8>) -> Attempt {
///         match target {
///             Some(level) => {
///                 *level = self.0;
///                 Attempt::Applied
///             }
///             None => Attempt::Blocked,
///         }
///     }
/// }
///
/// let mut retry = DeferredRetry::new(RetryPolicy::default());
/// let mut screen = None;
/// assert_eq!(
///     retry.request(Brightness(7), &mut screen),
///     TimerCommand::Arm(Duration::from_millis(100))
/// );
///
/// screen = Some(0);
/// assert_eq!(retry.on_retry_timer_fire(&mut screen), TimerCommand::Cancel);
/// assert_eq!(screen, Some(7));
/// ```
#[derive(Debug)]
pub struct DeferredRetry<A> {
    policy: RetryPolicy,
    pending: Option<Pending<A>>,
}

impl<A: DeferredAction> DeferredRetry<A> {
    /// Create an idle retry slot.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            pending: None,
        }
    }

    /// Apply `action` now or park it for retry.
    ///
    /// Any previously pending action of this class is discarded either way.
    /// Returns [`TimerCommand::Arm`] when the action was parked and
    /// [`TimerCommand::Cancel`] when it took effect.
    pub fn request(&mut self, action: A, target: &mut A::Target) -> TimerCommand {
        if self.pending.take().is_some() {
            debug!("deferred action superseded by a newer request");
        }
        match action.attempt(target) {
            Attempt::Applied => TimerCommand::Cancel,
            Attempt::Blocked => {
                debug!(
                    "deferred action blocked, retrying every {}ms",
                    self.policy.interval.as_millis()
                );
                self.pending = Some(Pending { action, retries: 0 });
                TimerCommand::Arm(self.policy.interval)
            }
        }
    }

    /// Re-check the pending action after its timer fired.
    pub fn on_retry_timer_fire(&mut self, target: &mut A::Target) -> TimerCommand {
        let Some(pending) = self.pending.as_mut() else {
            return TimerCommand::Cancel;
        };
        if pending.action.attempt(target) == Attempt::Applied {
            self.pending = None;
            return TimerCommand::Cancel;
        }
        pending.retries += 1;
        if pending.retries < self.policy.max_retries {
            return TimerCommand::Arm(self.policy.interval);
        }
        debug!(
            "deferred action abandoned after {} retries",
            pending.retries
        );
        metrics::inc_deferred_abandoned();
        self.pending = None;
        TimerCommand::Cancel
    }

    /// Drop the pending action, returning it.
    pub fn cancel(&mut self) -> Option<A> { self.pending.take().map(|pending| pending.action) }

    /// Action waiting for the foreground, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&A> { self.pending.as_ref().map(|pending| &pending.action) }

    /// Failed checks of the pending action so far.
    #[must_use]
    pub fn retries(&self) -> u32 { self.pending.as_ref().map_or(0, |pending| pending.retries) }
}

#[cfg(test)]
mod tests;
