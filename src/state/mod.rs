//! State management module
//!
//! This module contains the breathing cycle state machine, the controller
//! that drives it and the registry of open sessions.

pub mod phase;
pub mod cycle_state;
pub mod controller;
pub mod app_state;

// Re-export main types
pub use phase::{Phase, CYCLE_TICKS, PHASES, PHASE_SECONDS};
pub use cycle_state::CycleState;
pub use controller::BreathingController;
pub use app_state::{AppState, RegistryError};
