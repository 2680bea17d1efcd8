//! The running pipeline.
//!
//! [`Pipeline`] is the one context object built at startup. It owns the
//! shared store, the selected renderer, the scheduler and the cancellation
//! token, and wires them to a [`MembershipSource`]:
//!
//! ```text
//! source.watch --(unbounded channel)--> EventIngestion --> NodeStateStore
//!                                                               |
//!                            SnapshotScheduler --snapshot()-----+--> Renderer
//! ```
//!
//! All three run until the token is cancelled. A render failure, a feed
//! failure, or a feed that ends on its own cancels the token for everyone
//! and is returned as a [`PipelineError`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ingestion::{EventIngestion, IngestionStats};
use crate::render::Renderer;
use crate::scheduler::{SchedulerError, SnapshotScheduler};
use crate::source::{MembershipSource, SourceError};
use crate::store::NodeStateStore;

/// Errors that end a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The scheduler stopped on a render failure.
    #[error("printing periodically: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: SchedulerError,
    },

    /// The membership feed failed.
    #[error("membership feed failed: {source}")]
    Feed {
        /// The underlying source error.
        #[from]
        source: SourceError,
    },

    /// The membership feed stopped before shutdown was requested.
    #[error("membership feed ended unexpectedly")]
    FeedEnded,

    /// A pipeline task panicked or was aborted.
    #[error("pipeline task failed: {message}")]
    Task {
        /// Description of the join failure.
        message: String,
    },
}

impl From<JoinError> for PipelineError {
    fn from(e: JoinError) -> Self {
        Self::Task {
            message: e.to_string(),
        }
    }
}

/// Summary of a pipeline run that shut down cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Snapshots rendered.
    pub snapshots_rendered: u64,
    /// Events applied by ingestion.
    pub events: IngestionStats,
}

/// The process-wide context: store, renderer, scheduler and shutdown token.
pub struct Pipeline {
    store: Arc<NodeStateStore>,
    renderer: Box<dyn Renderer>,
    scheduler: SnapshotScheduler,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Assemble a pipeline around an existing store.
    pub fn new(
        store: Arc<NodeStateStore>,
        renderer: Box<dyn Renderer>,
        snapshot_interval: Duration,
    ) -> Self {
        Self {
            store,
            renderer,
            scheduler: SnapshotScheduler::new(snapshot_interval),
            cancel: CancellationToken::new(),
        }
    }

    /// The shared store.
    pub const fn store(&self) -> &Arc<NodeStateStore> {
        &self.store
    }

    /// A handle that shuts the pipeline down when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the feed, ingestion and scheduler until shutdown or failure.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if rendering fails, the feed fails or ends
    /// early, or a task panics.
    pub async fn run<S>(mut self, source: Arc<S>) -> Result<PipelineSummary, PipelineError>
    where
        S: MembershipSource,
    {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut feed = {
            let cancel = self.cancel.clone();
            tokio::spawn(async move { source.watch(tx, cancel).await })
        };

        let ingestion = tokio::spawn(
            EventIngestion::new(Arc::clone(&self.store)).run(rx, self.cancel.clone()),
        );

        info!(renderer = %self.renderer.kind(), "pipeline running");

        let mut feed_finished = None;
        let scheduled = tokio::select! {
            result = self.scheduler.run(&self.store, self.renderer.as_mut(), &self.cancel) => {
                Some(result)
            }
            joined = &mut feed => {
                feed_finished = Some(joined);
                None
            }
        };

        let shutdown_requested = self.cancel.is_cancelled();
        self.cancel.cancel();

        let feed_early = feed_finished.is_some();
        let feed_result = match feed_finished {
            Some(joined) => joined,
            None => feed.await,
        };
        let events = ingestion.await?;

        if let Some(Err(e)) = scheduled {
            return Err(e.into());
        }

        match feed_result? {
            Ok(()) if feed_early && !shutdown_requested => {
                return Err(PipelineError::FeedEnded);
            }
            Err(e) if feed_early && !shutdown_requested => return Err(e.into()),
            Err(e) => warn!(error = %e, "membership feed failed during shutdown"),
            Ok(()) => {}
        }

        let summary = PipelineSummary {
            snapshots_rendered: self.scheduler.rendered(),
            events,
        };
        info!(
            snapshots_rendered = summary.snapshots_rendered,
            events_applied = summary.events.total(),
            "pipeline stopped"
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("renderer", &self.renderer.kind())
            .field("scheduler", &self.scheduler)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
