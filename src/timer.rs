//! Timer requests emitted by the transport state machines.
//!
//! The coalescing queue and deferred retries never touch a clock. They return
//! a [`TimerCommand`] describing what should happen to their single timer and
//! the transport actor turns it into a deadline.

use std::time::Duration;

/// Instruction for the timer owned by a state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerCommand {
    /// Arm (or re-arm) the timer to fire after the given delay.
    Arm(Duration),
    /// Leave the timer as it is.
    Keep,
    /// Disarm the timer; the state machine is idle.
    Cancel,
}

impl TimerCommand {
    /// Delay requested by an [`Arm`](Self::Arm) command.
    #[must_use]
    pub const fn delay(self) -> Option<Duration> {
        match self {
            Self::Arm(delay) => Some(delay),
            Self::Keep | Self::Cancel => None,
        }
    }
}
