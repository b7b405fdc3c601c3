//! Main application state management

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{BreathingController, CycleState};

/// Errors raised by the session registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Opening another session would exceed the configured maximum
    LimitReached(usize),
    /// The registry lock was poisoned
    Lock(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::LimitReached(max) => write!(f, "Session limit of {} reached", max),
            RegistryError::Lock(e) => write!(f, "Failed to lock session registry: {}", e),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Application state: the open breathing sessions plus server metadata
#[derive(Debug)]
pub struct AppState {
    sessions: Mutex<HashMap<u64, Arc<BreathingController>>>,
    next_session_id: AtomicU64,
    pub max_sessions: usize,
    /// New sessions begin running as soon as they are opened
    pub autostart: bool,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create a new AppState with no open sessions
    pub fn new(port: u16, host: String, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_session_id: AtomicU64::new(1),
            max_sessions,
            autostart: false,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Start new sessions immediately when opened
    pub fn with_autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    /// Open a new breathing session at (Inhale, 4), running if autostart is set
    pub fn open_session(&self) -> Result<(u64, CycleState), RegistryError> {
        let mut sessions = self.sessions.lock()
            .map_err(|e| RegistryError::Lock(e.to_string()))?;

        if sessions.len() >= self.max_sessions {
            warn!("Refusing to open session: {} already open", sessions.len());
            return Err(RegistryError::LimitReached(self.max_sessions));
        }

        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let controller = BreathingController::new();
        let cycle = if self.autostart {
            controller.start()
        } else {
            controller.snapshot()
        };
        sessions.insert(id, Arc::new(controller));
        drop(sessions);

        info!("Opened breathing session {}", id);
        self.record_action(&format!("open {}", id));
        Ok((id, cycle))
    }

    /// Look up an open session
    pub fn session(&self, id: u64) -> Result<Option<Arc<BreathingController>>, RegistryError> {
        self.sessions.lock()
            .map(|sessions| sessions.get(&id).cloned())
            .map_err(|e| RegistryError::Lock(e.to_string()))
    }

    /// Close a session, releasing its tick source. Returns false if it was not open.
    pub fn close_session(&self, id: u64) -> Result<bool, RegistryError> {
        let removed = self.sessions.lock()
            .map_err(|e| RegistryError::Lock(e.to_string()))?
            .remove(&id);

        match removed {
            Some(_) => {
                info!("Closed breathing session {}", id);
                self.record_action(&format!("close {}", id));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Close every session, returning how many were open
    pub fn close_all(&self) -> Result<usize, RegistryError> {
        let drained: Vec<_> = self.sessions.lock()
            .map_err(|e| RegistryError::Lock(e.to_string()))?
            .drain()
            .collect();

        let count = drained.len();
        drop(drained);
        info!("Closed {} breathing session(s)", count);
        Ok(count)
    }

    /// Number of open sessions and how many of them are running
    pub fn session_counts(&self) -> Result<(usize, usize), RegistryError> {
        let sessions = self.sessions.lock()
            .map_err(|e| RegistryError::Lock(e.to_string()))?;

        let running = sessions.values().filter(|c| c.is_running()).count();
        Ok((sessions.len(), running))
    }

    /// Record the latest action for the status endpoint
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }
}

fn format_uptime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
