//! Deadlines backing the transport's two timers.

use std::future;

use tokio::time::{Instant, sleep_until};

use crate::timer::TimerCommand;

/// A single re-armable timer expressed as an optional deadline.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// Update the deadline as instructed by a state machine.
    pub(super) fn apply(&mut self, command: TimerCommand) {
        match command {
            TimerCommand::Arm(delay) => self.at = Some(Instant::now() + delay),
            TimerCommand::Keep => {}
            TimerCommand::Cancel => self.at = None,
        }
    }

    /// Forget the deadline once it has fired.
    pub(super) fn clear(&mut self) { self.at = None; }

    pub(super) fn is_armed(self) -> bool { self.at.is_some() }

    /// Resolve when the deadline passes; never resolves while disarmed.
    pub(super) async fn expired(self) {
        match self.at {
            Some(at) => sleep_until(at).await,
            None => future::pending().await,
        }
    }
}
