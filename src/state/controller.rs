//! Breathing cycle controller
//!
//! Owns one [`CycleState`] and the tick source that drives it. `start`,
//! `stop`, `toggle` and tick application are serialized by a single mutex,
//! and the latest state is published on a watch channel for the display layer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::CycleState;
use crate::tasks::TickSource;

struct Inner {
    cycle: CycleState,
    ticker: Option<TickSource>,
    /// Bumped on every start; a tick source only acts for the epoch it was spawned with
    epoch: u64,
}

/// State shared between a controller and its tick source
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    updates_tx: watch::Sender<CycleState>,
    /// Keep the receiver alive to prevent channel closure
    _updates_rx: watch::Receiver<CycleState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Critical sections only assign plain fields, a poisoned guard still holds a whole state
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Must be called with the lock held so watchers see changes in order
    fn publish(&self, cycle: CycleState) {
        if let Err(e) = self.updates_tx.send(cycle) {
            warn!("Failed to send cycle update: {}", e);
        }
    }

    /// Apply one tick on behalf of the tick source acquired at `epoch`.
    ///
    /// Returns `false` once that acquisition is no longer current, which
    /// tells the tick source to exit.
    pub(crate) fn tick_for(&self, epoch: u64) -> bool {
        let mut inner = self.lock();
        if !inner.cycle.running || inner.epoch != epoch {
            return false;
        }

        inner.cycle.tick();
        debug!(
            "Tick: phase={}, remaining={}s",
            inner.cycle.phase, inner.cycle.remaining_seconds
        );
        self.publish(inner.cycle);
        true
    }
}

/// A single breathing exercise: four phases of four seconds, repeating
/// while running.
///
/// Starting the controller spawns a tokio task, so it must be used from
/// within a tokio runtime.
pub struct BreathingController {
    shared: Arc<Shared>,
}

impl BreathingController {
    /// Create a stopped controller at (Inhale, 4)
    pub fn new() -> Self {
        Self::from_state(CycleState::new())
    }

    /// Create a stopped controller at a given point of the cycle
    pub fn from_state(cycle: CycleState) -> Self {
        let cycle = CycleState { running: false, ..cycle };
        let (updates_tx, updates_rx) = watch::channel(cycle);

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    cycle,
                    ticker: None,
                    epoch: 0,
                }),
                updates_tx,
                _updates_rx: updates_rx,
            }),
        }
    }

    /// Start the countdown. No effect if already running.
    pub fn start(&self) -> CycleState {
        let mut inner = self.shared.lock();
        if inner.cycle.running {
            debug!("Start requested while already running, ignoring");
        } else {
            self.start_locked(&mut inner);
        }
        inner.cycle
    }

    /// Stop the countdown, freezing phase and seconds. No effect if already stopped.
    pub fn stop(&self) -> CycleState {
        let mut inner = self.shared.lock();
        if inner.cycle.running {
            self.stop_locked(&mut inner);
        } else {
            debug!("Stop requested while already stopped, ignoring");
        }
        inner.cycle
    }

    /// Stop when running, start otherwise
    pub fn toggle(&self) -> CycleState {
        let mut inner = self.shared.lock();
        if inner.cycle.running {
            self.stop_locked(&mut inner);
        } else {
            self.start_locked(&mut inner);
        }
        inner.cycle
    }

    /// Current cycle state
    pub fn snapshot(&self) -> CycleState {
        self.shared.lock().cycle
    }

    /// Whether the countdown is active
    pub fn is_running(&self) -> bool {
        self.shared.lock().cycle.running
    }

    /// Watch the latest cycle state.
    ///
    /// Receivers are woken on start, stop and each tick, but a slow reader
    /// only sees the newest value; intermediate states may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.shared.updates_tx.subscribe()
    }

    fn start_locked(&self, inner: &mut Inner) {
        inner.epoch += 1;
        inner.cycle.running = true;
        inner.ticker = Some(TickSource::spawn(Arc::downgrade(&self.shared), inner.epoch));
        info!(
            "Breathing started at phase={}, remaining={}s",
            inner.cycle.phase, inner.cycle.remaining_seconds
        );
        self.shared.publish(inner.cycle);
    }

    fn stop_locked(&self, inner: &mut Inner) {
        inner.cycle.running = false;
        // Dropping the tick source aborts it before the lock is released
        inner.ticker = None;
        info!(
            "Breathing stopped at phase={}, remaining={}s",
            inner.cycle.phase, inner.cycle.remaining_seconds
        );
        self.shared.publish(inner.cycle);
    }
}

impl Default for BreathingController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BreathingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreathingController")
            .field("cycle", &self.snapshot())
            .finish()
    }
}

impl Drop for BreathingController {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if let Some(ticker) = inner.ticker.take() {
            debug!("Releasing tick source (epoch {}) on teardown", ticker.epoch());
        }
    }
}
