//! Concurrency-safe node-state store.
//!
//! [`NodeStateStore`] owns the mapping from node name to the latest
//! observed [`NodeRecord`]. The mapping itself is never exposed: callers can
//! only initialize, upsert, remove, and take a [`Snapshot`].
//!
//! Every operation runs inside one critical section guarded by a single
//! mutex. Records are stored behind [`Arc`] and never mutated in place, so a
//! snapshot is a cheap copy of pointers that later mutations cannot reach.
//! Nothing is logged or rendered while the lock is held.

use std::collections::BTreeMap;
use std::sync::Arc;

use nodestate_types::NodeRecord;
use tokio::sync::Mutex;
use tracing::info;

/// Outcome of an [`NodeStateStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No record existed for the name.
    Inserted,
    /// An existing record was fully replaced.
    Replaced,
}

/// An independent, point-in-time copy of every record in the store.
///
/// Records are ordered by node name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    nodes: Vec<Arc<NodeRecord>>,
}

impl Snapshot {
    /// Build a snapshot from records, ordering them by name.
    pub fn from_records(records: impl IntoIterator<Item = NodeRecord>) -> Self {
        let mut nodes: Vec<Arc<NodeRecord>> = records.into_iter().map(Arc::new).collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Self { nodes }
    }

    /// Number of records in the snapshot.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the records.
    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.iter().map(AsRef::as_ref)
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Option<&NodeRecord> {
        self.iter().find(|n| n.name == name)
    }

    /// Node names in snapshot order.
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|n| n.name.as_str()).collect()
    }
}

/// The single shared store of node records.
#[derive(Debug, Default)]
pub struct NodeStateStore {
    nodes: Mutex<BTreeMap<String, Arc<NodeRecord>>>,
}

impl NodeStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the store from a bulk listing.
    ///
    /// Meant to run once before the feed starts. Calling it again upserts
    /// each record a second time; existing records for other names are
    /// left untouched. Returns the number of records loaded.
    pub async fn initialize(&self, records: impl IntoIterator<Item = NodeRecord>) -> usize {
        let records: Vec<Arc<NodeRecord>> = records.into_iter().map(Arc::new).collect();

        {
            let mut nodes = self.nodes.lock().await;
            for record in &records {
                nodes.insert(record.name.clone(), Arc::clone(record));
            }
        }

        for record in &records {
            info!(node = record.name, "discovered initial node");
        }

        records.len()
    }

    /// Insert `record`, or fully replace the record with the same name.
    ///
    /// Fields missing from `record` are missing afterwards; nothing is
    /// merged from the previous version.
    pub async fn upsert(&self, record: NodeRecord) -> Upsert {
        let name = record.name.clone();
        let record = Arc::new(record);
        let previous = self.nodes.lock().await.insert(name, record);
        if previous.is_some() {
            Upsert::Replaced
        } else {
            Upsert::Inserted
        }
    }

    /// Remove the record for `name`. Removing an absent name is a no-op.
    ///
    /// Returns whether a record was removed.
    pub async fn remove(&self, name: &str) -> bool {
        self.nodes.lock().await.remove(name).is_some()
    }

    /// Take a consistent copy of every record currently held.
    pub async fn snapshot(&self) -> Snapshot {
        let nodes = self.nodes.lock().await.values().cloned().collect();
        Snapshot { nodes }
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.nodes.lock().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.nodes.lock().await.is_empty()
    }
}
