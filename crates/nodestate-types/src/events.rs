//! Membership change events.
//!
//! A feed delivers one [`NodeEvent`] per change, each carrying an owned copy
//! of the full record. On the wire events are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "added", "node": {"name": "node-1"}}
//! {"type": "updated", "previous": {"name": "node-1"}, "current": {"name": "node-1"}}
//! {"type": "deleted", "node": {"name": "node-1"}}
//! ```

use serde::{Deserialize, Serialize};

use crate::structs::NodeRecord;

/// A single membership change delivered by a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeEvent {
    /// A node joined the cluster (or was first observed).
    Added {
        /// The full record of the new node.
        node: NodeRecord,
    },
    /// A node's observed state changed.
    Updated {
        /// The record before the change, if the feed supplied it.
        #[serde(default)]
        previous: Option<NodeRecord>,
        /// The full record after the change.
        current: NodeRecord,
    },
    /// A node left the cluster.
    Deleted {
        /// The last known record of the node.
        node: NodeRecord,
    },
}

impl NodeEvent {
    /// Build an `Added` event.
    pub const fn added(node: NodeRecord) -> Self {
        Self::Added { node }
    }

    /// Build an `Updated` event without a previous record.
    pub const fn updated(current: NodeRecord) -> Self {
        Self::Updated {
            previous: None,
            current,
        }
    }

    /// Build a `Deleted` event.
    pub const fn deleted(node: NodeRecord) -> Self {
        Self::Deleted { node }
    }

    /// Name of the node this event concerns.
    pub fn node_name(&self) -> &str {
        match self {
            Self::Added { node } | Self::Deleted { node } => &node.name,
            Self::Updated { current, .. } => &current.name,
        }
    }

    /// Short lowercase label of the event kind, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Updated { .. } => "updated",
            Self::Deleted { .. } => "deleted",
        }
    }
}
