//! Breathing phases and their presentation keys

use serde::{Deserialize, Serialize};

/// Seconds spent in each phase
pub const PHASE_SECONDS: u64 = 4;

/// Phases in the order they are visited
pub const PHASES: [Phase; 4] = [Phase::Inhale, Phase::Hold, Phase::Exhale, Phase::Pause];

/// Ticks needed to return to the starting configuration
pub const CYCLE_TICKS: u64 = PHASES.len() as u64 * PHASE_SECONDS;

/// One segment of the box-breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
    Pause,
}

impl Phase {
    /// Position of this phase in [`PHASES`]
    pub fn index(self) -> usize {
        match self {
            Phase::Inhale => 0,
            Phase::Hold => 1,
            Phase::Exhale => 2,
            Phase::Pause => 3,
        }
    }

    /// The phase that follows this one, wrapping Pause back to Inhale
    pub fn next(self) -> Self {
        PHASES[(self.index() + 1) % PHASES.len()]
    }

    /// Instruction shown while the phase is active
    pub fn label(self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe in...",
            Phase::Hold => "Hold...",
            Phase::Exhale => "Breathe out...",
            Phase::Pause => "Wait...",
        }
    }

    /// Whether the breathing circle is drawn expanded
    pub fn expanded(self) -> bool {
        matches!(self, Phase::Inhale | Phase::Hold)
    }

    /// Relative circle size in percent
    pub fn size_percent(self) -> u8 {
        if self.expanded() { 100 } else { 40 }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Inhale => "inhale",
            Phase::Hold => "hold",
            Phase::Exhale => "exhale",
            Phase::Pause => "pause",
        };
        f.write_str(name)
    }
}
