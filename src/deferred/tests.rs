//! Tests for the deferred retry slot.

use std::time::Duration;

use rstest::{fixture, rstest};

use super::{Attempt, DeferredAction, DeferredRetry, RetryPolicy};
use crate::timer::TimerCommand;

const INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct Screen {
    obscured: bool,
    applied: Vec<i32>,
    checks: usize,
}

#[derive(Debug, PartialEq, Eq)]
struct SetOffset(i32);

impl DeferredAction for SetOffset {
    type Target = Screen;

    fn attempt(&self, target: &mut Screen) -> Attempt {
        target.checks += 1;
        if target.obscured {
            return Attempt::Blocked;
        }
        target.applied.push(self.0);
        Attempt::Applied
    }
}

#[fixture]
fn retry() -> DeferredRetry<SetOffset> {
    DeferredRetry::new(RetryPolicy {
        interval: INTERVAL,
        max_retries: 3,
    })
}

#[fixture]
fn obscured() -> Screen {
    Screen {
        obscured: true,
        ..Screen::default()
    }
}

#[rstest]
fn reachable_target_applies_immediately(mut retry: DeferredRetry<SetOffset>) {
    let mut screen = Screen::default();
    assert_eq!(retry.request(SetOffset(5), &mut screen), TimerCommand::Cancel);
    assert_eq!(screen.applied, vec![5]);
    assert!(retry.pending().is_none());
}

#[rstest]
fn blocked_target_parks_action(mut retry: DeferredRetry<SetOffset>, mut obscured: Screen) {
    assert_eq!(
        retry.request(SetOffset(5), &mut obscured),
        TimerCommand::Arm(INTERVAL)
    );
    assert_eq!(retry.pending(), Some(&SetOffset(5)));
    assert_eq!(retry.retries(), 0);

    obscured.obscured = false;
    assert_eq!(retry.on_retry_timer_fire(&mut obscured), TimerCommand::Cancel);
    assert_eq!(obscured.applied, vec![5]);
    assert!(retry.pending().is_none());
}

#[rstest]
fn newer_request_supersedes_pending_one(
    mut retry: DeferredRetry<SetOffset>,
    mut obscured: Screen,
) {
    retry.request(SetOffset(1), &mut obscured);
    retry.on_retry_timer_fire(&mut obscured);
    assert_eq!(retry.retries(), 1);

    assert_eq!(
        retry.request(SetOffset(2), &mut obscured),
        TimerCommand::Arm(INTERVAL)
    );
    assert_eq!(retry.pending(), Some(&SetOffset(2)));
    assert_eq!(retry.retries(), 0);

    obscured.obscured = false;
    retry.on_retry_timer_fire(&mut obscured);
    assert_eq!(obscured.applied, vec![2]);
}

#[rstest]
fn immediate_success_clears_older_pending_action(
    mut retry: DeferredRetry<SetOffset>,
    mut obscured: Screen,
) {
    retry.request(SetOffset(1), &mut obscured);
    obscured.obscured = false;
    assert_eq!(retry.request(SetOffset(2), &mut obscured), TimerCommand::Cancel);
    assert!(retry.pending().is_none());
    assert_eq!(retry.on_retry_timer_fire(&mut obscured), TimerCommand::Cancel);
    assert_eq!(obscured.applied, vec![2]);
}

#[rstest]
fn gives_up_after_max_retries(mut retry: DeferredRetry<SetOffset>, mut obscured: Screen) {
    retry.request(SetOffset(9), &mut obscured);
    assert_eq!(retry.on_retry_timer_fire(&mut obscured), TimerCommand::Arm(INTERVAL));
    assert_eq!(retry.on_retry_timer_fire(&mut obscured), TimerCommand::Arm(INTERVAL));
    assert_eq!(retry.on_retry_timer_fire(&mut obscured), TimerCommand::Cancel);
    assert!(retry.pending().is_none());
    assert_eq!(obscured.checks, 4);

    obscured.obscured = false;
    assert_eq!(retry.on_retry_timer_fire(&mut obscured), TimerCommand::Cancel);
    assert!(obscured.applied.is_empty());
}

#[rstest]
fn cancel_returns_pending_action(mut retry: DeferredRetry<SetOffset>, mut obscured: Screen) {
    retry.request(SetOffset(3), &mut obscured);
    assert_eq!(retry.cancel(), Some(SetOffset(3)));
    assert!(retry.pending().is_none());
}
