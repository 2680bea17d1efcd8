//! Event ingestion.
//!
//! [`EventIngestion`] is the only writer of the store once the feed is
//! running. It consumes [`NodeEvent`]s from a channel in delivery order and
//! applies each one before reading the next:
//!
//! - `Added` and `Updated` upsert the full record (no merge).
//! - `Deleted` removes the name; deleting an absent name is a no-op.
//!
//! No version or ordering token is consulted. A stale `Updated` delivered
//! after a `Deleted` for the same name brings the record back.

use std::sync::Arc;

use nodestate_types::NodeEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::store::{NodeStateStore, Upsert};

/// What applying one event did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A record was inserted for a new name.
    Inserted,
    /// An existing record was replaced.
    Replaced,
    /// A record was removed.
    Removed,
    /// A delete named a node that was not present.
    Absent,
}

/// Counts of events applied by one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// `Added` events applied.
    pub added: u64,
    /// `Updated` events applied.
    pub updated: u64,
    /// `Deleted` events applied.
    pub deleted: u64,
}

impl IngestionStats {
    /// Total number of events applied.
    pub const fn total(&self) -> u64 {
        self.added
            .saturating_add(self.updated)
            .saturating_add(self.deleted)
    }
}

/// Applies membership events to a shared store.
#[derive(Debug, Clone)]
pub struct EventIngestion {
    store: Arc<NodeStateStore>,
}

impl EventIngestion {
    /// Create an ingestion stage writing to `store`.
    pub const fn new(store: Arc<NodeStateStore>) -> Self {
        Self { store }
    }

    /// Apply a single event.
    pub async fn apply(&self, event: NodeEvent) -> Transition {
        match event {
            NodeEvent::Added { node } => {
                let name = node.name.clone();
                let outcome = self.store.upsert(node).await;
                info!(node = name, "new node added to cluster");
                upsert_transition(outcome)
            }
            NodeEvent::Updated { current, .. } => {
                let name = current.name.clone();
                let outcome = self.store.upsert(current).await;
                info!(node = name, "existing node updated");
                upsert_transition(outcome)
            }
            NodeEvent::Deleted { node } => {
                let removed = self.store.remove(&node.name).await;
                info!(node = node.name, "node deleted from cluster");
                if removed {
                    Transition::Removed
                } else {
                    debug!(node = node.name, "deleted node was not tracked");
                    Transition::Absent
                }
            }
        }
    }

    /// Consume events until the channel closes or `cancel` fires.
    ///
    /// The channel closes when the feed drops its sender, which it does
    /// once it observes the same cancellation token.
    pub async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<NodeEvent>,
        cancel: CancellationToken,
    ) -> IngestionStats {
        let mut stats = IngestionStats::default();

        loop {
            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            match &event {
                NodeEvent::Added { .. } => stats.added = stats.added.saturating_add(1),
                NodeEvent::Updated { .. } => stats.updated = stats.updated.saturating_add(1),
                NodeEvent::Deleted { .. } => stats.deleted = stats.deleted.saturating_add(1),
            }
            self.apply(event).await;
        }

        debug!(
            added = stats.added,
            updated = stats.updated,
            deleted = stats.deleted,
            "event ingestion stopped"
        );
        stats
    }
}

const fn upsert_transition(outcome: Upsert) -> Transition {
    match outcome {
        Upsert::Inserted => Transition::Inserted,
        Upsert::Replaced => Transition::Replaced,
    }
}
