//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{CycleState, Phase};

/// What the display layer renders for one breathing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingView {
    pub id: u64,
    pub phase: Phase,
    pub label: String,
    /// Circle drawn expanded (Inhale, Hold) or contracted (Exhale, Pause)
    pub expanded: bool,
    pub size_percent: u8,
    pub remaining_seconds: u64,
    pub running: bool,
    /// Caption of the start/stop toggle
    pub toggle_label: String,
}

impl BreathingView {
    pub fn new(id: u64, cycle: &CycleState) -> Self {
        Self {
            id,
            phase: cycle.phase,
            label: cycle.phase.label().to_string(),
            expanded: cycle.phase.expanded(),
            size_percent: cycle.phase.size_percent(),
            remaining_seconds: cycle.remaining_seconds,
            running: cycle.running,
            toggle_label: if cycle.running { "Stop" } else { "Start" }.to_string(),
        }
    }
}

/// API response structure for session endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: BreathingView,
}

impl ApiResponse {
    /// Create a new API response, with status derived from the session
    pub fn new(message: String, session: BreathingView) -> Self {
        let status = if session.running { "running" } else { "stopped" };
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            session,
        }
    }
}

/// Server status with session counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub open_sessions: usize,
    pub running_sessions: usize,
    pub max_sessions: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
