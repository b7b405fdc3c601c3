//! Box Breathing - A state-managed HTTP server hosting breathing exercise timers
//!
//! Each session runs a four-phase cycle (inhale, hold, exhale, pause) of four
//! seconds per phase, advanced once per second while running.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, BreathingController, CycleState, Phase};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
