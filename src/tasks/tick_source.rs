//! Periodic tick source driving a breathing controller

use std::{sync::Weak, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::state::controller::Shared;

/// Interval between ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A running once-per-second tick task.
///
/// Acquired when a controller starts and released when it stops or is
/// dropped. Dropping the source aborts the task.
pub struct TickSource {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl TickSource {
    /// Spawn a tick task for the acquisition identified by `epoch`.
    ///
    /// The first tick fires one full period after this call.
    pub(crate) fn spawn(shared: Weak<Shared>, epoch: u64) -> Self {
        debug!("Acquiring tick source (epoch {})", epoch);
        let first_tick = Instant::now() + TICK_PERIOD;
        let handle = tokio::spawn(tick_loop(shared, epoch, first_tick));
        Self { epoch, handle }
    }

    /// Acquisition this source belongs to
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("Tick source (epoch {}) released", self.epoch);
    }
}

async fn tick_loop(shared: Weak<Shared>, epoch: u64, first_tick: Instant) {
    let mut interval = interval_at(first_tick, TICK_PERIOD);
    // A stalled runtime must not replay missed seconds as a burst
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(shared) = shared.upgrade() else {
            debug!("Controller gone, tick source (epoch {}) exiting", epoch);
            break;
        };

        if !shared.tick_for(epoch) {
            debug!("Tick source (epoch {}) is stale, exiting", epoch);
            break;
        }
    }
}
