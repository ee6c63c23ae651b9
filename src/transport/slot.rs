//! A deferred retry class paired with the deadline that drives it.

use super::deadline::Deadline;
use crate::deferred::{DeferredAction, DeferredRetry, RetryPolicy};

/// One [`DeferredRetry`] slot and its own retry deadline.
#[derive(Debug)]
pub(super) struct DeferredSlot<A> {
    retry: DeferredRetry<A>,
    deadline: Deadline,
}

impl<A: DeferredAction> DeferredSlot<A> {
    pub(super) fn new(policy: RetryPolicy) -> Self {
        Self {
            retry: DeferredRetry::new(policy),
            deadline: Deadline::default(),
        }
    }

    /// Apply `action` now or park it, re-arming this slot's deadline.
    pub(super) fn request(&mut self, action: A, target: &mut A::Target) {
        let command = self.retry.request(action, target);
        self.deadline.apply(command);
    }

    /// Re-check the parked action once this slot's deadline has fired.
    pub(super) fn on_timer_fire(&mut self, target: &mut A::Target) {
        self.deadline.clear();
        let command = self.retry.on_retry_timer_fire(target);
        self.deadline.apply(command);
    }

    pub(super) fn deadline(&self) -> Deadline { self.deadline }

    pub(super) fn pending(&self) -> Option<&A> { self.retry.pending() }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::deferred::Attempt;

    struct Set(u8);

    impl DeferredAction for Set {
        type Target = Option<u8>;

        fn attempt(&self, target: &mut Option<u8>) -> Attempt {
            match target {
                Some(value) => {
                    *value = self.0;
                    Attempt::Applied
                }
                None => Attempt::Blocked,
            }
        }
    }

    #[fixture]
    fn slot() -> DeferredSlot<Set> {
        DeferredSlot::new(RetryPolicy {
            interval: Duration::from_millis(100),
            max_retries: 3,
        })
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn blocked_request_arms_only_its_own_deadline(mut slot: DeferredSlot<Set>) {
        let mut other = DeferredSlot::<Set>::new(RetryPolicy::default());
        let mut target = None;

        slot.request(Set(4), &mut target);

        assert!(slot.deadline().is_armed());
        assert!(!other.deadline().is_armed());
        other.request(Set(9), &mut Some(0));
        assert!(!other.deadline().is_armed());
        assert!(slot.deadline().is_armed());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn applied_retry_disarms_the_deadline(mut slot: DeferredSlot<Set>) {
        let mut target = None;
        slot.request(Set(4), &mut target);

        target = Some(0);
        slot.on_timer_fire(&mut target);

        assert_eq!(target, Some(4));
        assert!(slot.pending().is_none());
        assert!(!slot.deadline().is_armed());
    }
}
