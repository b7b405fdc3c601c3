//! Background tasks module
//!
//! This module contains the timer task that advances breathing sessions.

pub mod tick_source;

// Re-export main types
pub use tick_source::{TickSource, TICK_PERIOD};
