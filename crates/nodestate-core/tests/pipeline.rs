//! End-to-end tests for the node-state pipeline.
//!
//! These drive the initial load, the feed, ingestion and the scheduler
//! together against a [`StaticMembershipSource`], with the tokio clock
//! paused so every interval elapses instantly.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use nodestate_core::bootstrap::{DEFAULT_INITIAL_LOAD_TIMEOUT, initial_load};
use nodestate_core::pipeline::Pipeline;
use nodestate_core::render::{RenderError, Renderer, RendererKind};
use nodestate_core::source::StaticMembershipSource;
use nodestate_core::store::{NodeStateStore, Snapshot};
use nodestate_types::{AddressRole, ConditionStatus, NodeEvent, NodeRecord};

// =============================================================================
// Helper: a renderer that keeps every snapshot it is given
// =============================================================================

#[derive(Clone, Default)]
struct Capture {
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl Capture {
    fn taken(&self) -> Vec<Snapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

impl Renderer for Capture {
    fn kind(&self) -> RendererKind {
        RendererKind::Structured
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

fn node_1() -> NodeRecord {
    NodeRecord::new("node-1")
        .with_address(AddressRole::InternalIp, "10.0.0.1")
        .with_condition("Ready", ConditionStatus::True)
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn initial_load_then_events_are_visible_in_later_snapshots() {
    let source = Arc::new(StaticMembershipSource::new(
        vec![node_1()],
        vec![
            NodeEvent::added(
                NodeRecord::new("node-2").with_taint("dedicated", "gpu"),
            ),
            NodeEvent::updated(NodeRecord::new("node-1")),
        ],
    ));
    let store = Arc::new(NodeStateStore::new());
    let loaded = initial_load(source.as_ref(), &store, DEFAULT_INITIAL_LOAD_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(loaded, 1);

    let capture = Capture::default();
    let pipeline = Pipeline::new(
        Arc::clone(&store),
        Box::new(capture.clone()),
        Duration::from_secs(60),
    );
    let shutdown = pipeline.shutdown_token();
    let run = tokio::spawn(pipeline.run(source));

    tokio::time::sleep(Duration::from_secs(61)).await;
    shutdown.cancel();
    let summary = run.await.unwrap().unwrap();

    assert_eq!(summary.snapshots_rendered, 1);
    assert_eq!(summary.events.total(), 2);

    let taken = capture.taken();
    assert_eq!(taken.len(), 1);
    let snapshot = &taken[0];
    assert_eq!(snapshot.names(), ["node-1", "node-2"]);

    // The update replaced node-1 wholesale.
    let node = snapshot.get("node-1").unwrap();
    assert!(node.addresses.is_empty());
    assert!(node.conditions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn add_then_delete_leaves_an_empty_snapshot() {
    let source = Arc::new(StaticMembershipSource::new(
        Vec::new(),
        vec![
            NodeEvent::added(node_1()),
            NodeEvent::deleted(NodeRecord::new("node-1")),
            NodeEvent::deleted(NodeRecord::new("node-1")),
        ],
    ));
    let capture = Capture::default();
    let pipeline = Pipeline::new(
        Arc::new(NodeStateStore::new()),
        Box::new(capture.clone()),
        Duration::from_secs(60),
    );
    let shutdown = pipeline.shutdown_token();
    let run = tokio::spawn(pipeline.run(source));

    tokio::time::sleep(Duration::from_secs(121)).await;
    shutdown.cancel();
    let summary = run.await.unwrap().unwrap();

    assert_eq!(summary.snapshots_rendered, 2);
    assert_eq!(summary.events.deleted, 2);
    for snapshot in capture.taken() {
        assert!(snapshot.is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn snapshots_already_rendered_do_not_change() {
    let store = Arc::new(NodeStateStore::new());
    store.initialize([node_1()]).await;

    let before = store.snapshot().await;
    store.remove("node-1").await;
    store.upsert(NodeRecord::new("node-3")).await;

    assert_eq!(before.names(), ["node-1"]);
    assert_eq!(
        before.get("node-1").unwrap().address(AddressRole::InternalIp),
        Some("10.0.0.1")
    );
    assert_eq!(store.snapshot().await.names(), ["node-3"]);
}
