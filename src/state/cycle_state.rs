//! Cycle state structure and its tick transition

use serde::{Deserialize, Serialize};

use super::phase::{Phase, PHASE_SECONDS};

/// Position within the breathing cycle plus the running flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    pub phase: Phase,
    /// Countdown within the current phase, always in `1..=PHASE_SECONDS`
    pub remaining_seconds: u64,
    pub running: bool,
}

impl CycleState {
    /// Create the initial state: Inhale, full countdown, stopped
    pub fn new() -> Self {
        Self {
            phase: Phase::Inhale,
            remaining_seconds: PHASE_SECONDS,
            running: false,
        }
    }

    /// Create a stopped state at an arbitrary point of the cycle.
    ///
    /// Returns `None` when `remaining_seconds` is outside `1..=PHASE_SECONDS`.
    pub fn at(phase: Phase, remaining_seconds: u64) -> Option<Self> {
        if (1..=PHASE_SECONDS).contains(&remaining_seconds) {
            Some(Self {
                phase,
                remaining_seconds,
                running: false,
            })
        } else {
            None
        }
    }

    /// Advance by one second.
    ///
    /// Counts down within the phase; on the last second moves to the next
    /// phase with a full countdown. Does not look at `running`.
    pub fn tick(&mut self) {
        if self.remaining_seconds > 1 {
            self.remaining_seconds -= 1;
        } else {
            self.phase = self.phase.next();
            self.remaining_seconds = PHASE_SECONDS;
        }
    }

    /// Position as a `(phase, remaining_seconds)` pair
    pub fn position(&self) -> (Phase, u64) {
        (self.phase, self.remaining_seconds)
    }
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}
