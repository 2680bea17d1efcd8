//! Periodic snapshot scheduler.
//!
//! [`SnapshotScheduler::run`] drives the output side of the pipeline:
//!
//! - **Fixed interval**: the first snapshot is rendered one full interval
//!   after start, then once per interval.
//! - **Clean shutdown**: cancellation stops the loop between ticks and
//!   returns `Ok`.
//! - **Fatal render failure**: a failed render stops the loop and the error
//!   is returned. There is no retry and no skip; the caller is expected to
//!   tear the process down.

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::render::{RenderError, Renderer};
use crate::store::NodeStateStore;

/// Default interval between snapshots.
pub const DEFAULT_SNAPSHOT_INTERVAL: Duration = Duration::from_secs(60);

/// Errors that stop the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The renderer failed on a snapshot.
    #[error("rendering nodes: {source}")]
    Render {
        /// The underlying render error.
        #[from]
        source: RenderError,
    },

    /// The scheduler was built with a zero interval.
    #[error("snapshot interval must be greater than zero")]
    ZeroInterval,
}

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Ticking and rendering.
    Running,
    /// Cancelled or failed; will not tick again.
    Stopped,
}

/// Renders a snapshot of the store once per interval.
#[derive(Debug)]
pub struct SnapshotScheduler {
    interval: Duration,
    state: SchedulerState,
    rendered: u64,
}

impl SnapshotScheduler {
    /// Create a scheduler ticking every `interval`.
    ///
    /// A zero `interval` is rejected when [`run`](Self::run) starts.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: SchedulerState::Stopped,
            rendered: 0,
        }
    }

    /// The configured interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of snapshots rendered successfully so far.
    pub const fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Run until `cancel` fires or a render fails.
    ///
    /// Returns the number of snapshots rendered during this run.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroInterval`] if the interval is zero, or
    /// [`SchedulerError::Render`] on the first render failure.
    pub async fn run(
        &mut self,
        store: &NodeStateStore,
        renderer: &mut dyn Renderer,
        cancel: &CancellationToken,
    ) -> Result<u64, SchedulerError> {
        if self.interval.is_zero() {
            self.state = SchedulerState::Stopped;
            return Err(SchedulerError::ZeroInterval);
        }

        let started_with = self.rendered;
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        ticker.tick().await;

        self.state = SchedulerState::Running;
        info!(
            interval_secs = self.interval.as_secs(),
            renderer = %renderer.kind(),
            "snapshot scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    self.state = SchedulerState::Stopped;
                    info!(rendered = self.rendered, "snapshot scheduler cancelled");
                    return Ok(self.rendered.saturating_sub(started_with));
                }
                _ = ticker.tick() => {}
            }

            let snapshot = store.snapshot().await;
            let nodes = snapshot.len();

            if let Err(e) = renderer.render(&snapshot) {
                self.state = SchedulerState::Stopped;
                error!(error = %e, nodes, "render failed, stopping scheduler");
                return Err(e.into());
            }

            self.rendered = self.rendered.saturating_add(1);
            debug!(nodes, rendered = self.rendered, "snapshot rendered");
        }
    }
}

impl Default for SnapshotScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_INTERVAL)
    }
}
