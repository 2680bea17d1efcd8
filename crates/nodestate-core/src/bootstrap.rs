//! Initial bulk load of the store.
//!
//! Runs once at startup, before the feed and scheduler start. A timeout or
//! source failure is fatal; nothing is retried and the store is left
//! untouched on failure.

use std::time::Duration;

use tracing::info;

use crate::source::{MembershipSource, SourceError};
use crate::store::NodeStateStore;

/// Default deadline for the initial listing.
pub const DEFAULT_INITIAL_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that abort the initial load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The listing did not complete within the deadline.
    #[error("discovering initial nodes: timed out after {}s", timeout.as_secs())]
    Timeout {
        /// The deadline that expired.
        timeout: Duration,
    },

    /// The source failed to list nodes.
    #[error("discovering initial nodes: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: SourceError,
    },
}

/// List every node from `source` and load it into `store`.
///
/// Returns the number of nodes loaded.
///
/// # Errors
///
/// Returns [`LoadError::Timeout`] if the listing exceeds `timeout`, or
/// [`LoadError::Source`] if the source fails.
pub async fn initial_load<S>(
    source: &S,
    store: &NodeStateStore,
    timeout: Duration,
) -> Result<usize, LoadError>
where
    S: MembershipSource,
{
    info!(timeout_secs = timeout.as_secs(), "listing initial nodes");

    let nodes = tokio::time::timeout(timeout, source.list_nodes())
        .await
        .map_err(|_elapsed| LoadError::Timeout { timeout })??;

    let loaded = store.initialize(nodes).await;
    info!(nodes = loaded, "initial node listing loaded");
    Ok(loaded)
}
