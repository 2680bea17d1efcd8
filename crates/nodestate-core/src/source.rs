//! Membership source trait and a static implementation.
//!
//! A [`MembershipSource`] provides the two things the pipeline needs from
//! the cluster: a one-shot listing of every current node, and a stream of
//! [`NodeEvent`]s pushed onto a channel until cancelled. How it discovers
//! membership, and any retry or resync it does, is its own business.
//!
//! [`StaticMembershipSource`] serves a fixed listing and replays a fixed
//! script of events. It backs the tests and dry runs.

use std::future::Future;

use nodestate_types::{NodeEvent, NodeRecord};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors reported by a membership source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source could not reach the cluster.
    #[error("connection error: {message}")]
    Connection {
        /// Description of the failure.
        message: String,
    },

    /// Subscribing to change notifications failed.
    #[error("subscription error: {message}")]
    Subscription {
        /// Description of the failure.
        message: String,
    },

    /// A listing could not be decoded.
    #[error("decode error: {message}")]
    Decode {
        /// Description of the failure.
        message: String,
    },

    /// The change stream ended while the pipeline was still running.
    #[error("event stream closed")]
    Closed,
}

/// Discovers cluster membership and delivers change events.
pub trait MembershipSource: Send + Sync + 'static {
    /// List every node currently in the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the listing cannot be obtained.
    fn list_nodes(&self) -> impl Future<Output = Result<Vec<NodeRecord>, SourceError>> + Send;

    /// Push change events onto `events` until `cancel` fires.
    ///
    /// Returning drops `events`, which ends ingestion. Returning `Ok`
    /// before cancellation means the stream ended on its own.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the stream cannot be established or
    /// breaks.
    fn watch(
        &self,
        events: mpsc::UnboundedSender<NodeEvent>,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<(), SourceError>> + Send;
}

/// A source with a fixed listing and a scripted event sequence.
///
/// `watch` sends every scripted event in order and then waits for
/// cancellation, like a live feed with no further changes.
#[derive(Debug, Clone, Default)]
pub struct StaticMembershipSource {
    nodes: Vec<NodeRecord>,
    events: Vec<NodeEvent>,
}

impl StaticMembershipSource {
    /// Create a source listing `nodes` and replaying `events`.
    pub const fn new(nodes: Vec<NodeRecord>, events: Vec<NodeEvent>) -> Self {
        Self { nodes, events }
    }
}

impl MembershipSource for StaticMembershipSource {
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>, SourceError> {
        Ok(self.nodes.clone())
    }

    async fn watch(
        &self,
        events: mpsc::UnboundedSender<NodeEvent>,
        cancel: CancellationToken,
    ) -> Result<(), SourceError> {
        for event in &self.events {
            if events.send(event.clone()).is_err() {
                debug!("event receiver dropped, stopping static feed");
                return Ok(());
            }
        }
        cancel.cancelled().await;
        Ok(())
    }
}
