//! Renderer tests against whole snapshots taken from a live store.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::indexing_slicing)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use nodestate_core::render::{RenderError, Renderer, RendererKind};
use nodestate_core::store::NodeStateStore;
use nodestate_render::NodeRenderer;
use nodestate_types::{AddressRole, ConditionStatus, NodeRecord};

// =============================================================================
// Helper: a writer whose bytes the test can read back
// =============================================================================

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A writer whose every write fails, like a closed stdout.
struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn renderer(kind: RendererKind) -> (NodeRenderer, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (NodeRenderer::with_writer(kind, Box::new(buffer.clone())), buffer)
}

fn node_1() -> NodeRecord {
    NodeRecord::new("node-1")
        .with_address(AddressRole::InternalIp, "10.0.0.1")
        .with_condition("Ready", ConditionStatus::True)
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn structured_renders_the_single_node() {
    let store = NodeStateStore::new();
    store.upsert(node_1()).await;
    let (mut renderer, buffer) = renderer(RendererKind::Structured);

    renderer.render(&store.snapshot().await).unwrap();

    let text = buffer.text();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["nodeInternalIP"], "10.0.0.1");
    assert_eq!(lines[0]["nodeExternalIP"], "");
    assert_eq!(lines[0]["conditions"], serde_json::json!(["Ready"]));
    assert_eq!(lines[0]["level"], "info");
}

#[tokio::test]
async fn table_after_delete_has_no_address_columns() {
    let store = NodeStateStore::new();
    store.upsert(node_1()).await;
    store.remove("node-1").await;
    let (mut renderer, buffer) = renderer(RendererKind::Table);

    renderer.render(&store.snapshot().await).unwrap();

    let text = buffer.text();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Nodes at "));
    assert_eq!(lines[2], "│ Hostname │ Conditions │ Taints │");
    assert!(text.contains("│ Total    │ 0          │"));
}

#[tokio::test]
async fn columns_are_recomputed_on_every_render() {
    let store = NodeStateStore::new();
    store.upsert(node_1()).await;
    let (mut renderer, buffer) = renderer(RendererKind::Table);

    renderer.render(&store.snapshot().await).unwrap();
    store.remove("node-1").await;
    store
        .upsert(NodeRecord::new("node-2").with_address(AddressRole::ExternalIp, "203.0.113.7"))
        .await;
    renderer.render(&store.snapshot().await).unwrap();

    let text = buffer.text();
    let (first, second) = text.split_at(text.rfind("Nodes at").unwrap());
    assert!(first.contains("Internal IP") && !first.contains("External IP"));
    assert!(second.contains("External IP") && !second.contains("Internal IP"));
}

#[tokio::test]
async fn logfmt_lists_only_true_conditions() {
    let store = NodeStateStore::new();
    store
        .upsert(
            NodeRecord::new("node-1")
                .with_condition("Ready", ConditionStatus::True)
                .with_condition("DiskPressure", ConditionStatus::False),
        )
        .await;
    let (mut renderer, buffer) = renderer(RendererKind::Logfmt);

    renderer.render(&store.snapshot().await).unwrap();

    let text = buffer.text();
    assert!(text.ends_with(" level=info conditions=Ready\n"), "{text}");
}

#[test]
fn selected_renderer_reports_its_kind() {
    for kind in RendererKind::ALL {
        assert_eq!(NodeRenderer::stdout(kind).kind(), kind);
    }
}

#[tokio::test]
async fn write_failure_is_a_render_error() {
    let store = NodeStateStore::new();
    store.upsert(node_1()).await;

    for kind in RendererKind::ALL {
        let mut renderer = NodeRenderer::with_writer(kind, Box::new(ClosedPipe));
        let result = renderer.render(&store.snapshot().await);
        assert!(matches!(result, Err(RenderError::Io { .. })), "{kind}");
    }
}
