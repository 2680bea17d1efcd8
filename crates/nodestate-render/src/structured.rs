//! Structured renderer: one JSON event per node per line.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use nodestate_core::render::{RenderError, Renderer, RendererKind};
use nodestate_core::store::Snapshot;
use nodestate_types::{AddressRole, NodeRecord};
use serde::Serialize;
use tracing::trace;

/// One node as a structured event. Field order is the output key order.
#[derive(Debug, Serialize)]
struct NodeLine<'a> {
    level: &'static str,
    #[serde(rename = "nodeInternalIP")]
    node_internal_ip: &'a str,
    #[serde(rename = "nodeExternalIP")]
    node_external_ip: &'a str,
    #[serde(rename = "nodeInternalDNSName")]
    node_internal_dns_name: &'a str,
    #[serde(rename = "nodeExternalDNSName")]
    node_external_dns_name: &'a str,
    conditions: Vec<&'a str>,
    taints: Vec<String>,
    time: &'a str,
}

impl<'a> NodeLine<'a> {
    fn new(node: &'a NodeRecord, time: &'a str) -> Self {
        let addr = move |role| node.address(role).unwrap_or_default();
        Self {
            level: "info",
            node_internal_ip: addr(AddressRole::InternalIp),
            node_external_ip: addr(AddressRole::ExternalIp),
            node_internal_dns_name: addr(AddressRole::InternalDns),
            node_external_dns_name: addr(AddressRole::ExternalDns),
            conditions: node.true_conditions().collect(),
            taints: node.taint_labels().collect(),
            time,
        }
    }
}

/// Writes each node as a single-line JSON object.
///
/// Every address field is always present, empty when the node does not
/// report that role.
pub struct StructuredRenderer {
    out: Box<dyn Write + Send>,
}

impl StructuredRenderer {
    /// Render to stdout.
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Render to `out`.
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Format `snapshot` as it would be rendered at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if a node cannot be serialized.
    pub fn format(snapshot: &Snapshot, now: DateTime<Utc>) -> Result<String, RenderError> {
        let time = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut text = String::new();
        for node in snapshot.iter() {
            let line = serde_json::to_string(&NodeLine::new(node, &time)).map_err(|e| {
                RenderError::Encode {
                    message: format!("node {}: {e}", node.name),
                }
            })?;
            text.push_str(&line);
            text.push('\n');
        }
        Ok(text)
    }
}

impl Renderer for StructuredRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Structured
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let text = Self::format(snapshot, Utc::now())?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        trace!(nodes = snapshot.len(), "structured snapshot written");
        Ok(())
    }
}

impl std::fmt::Debug for StructuredRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredRenderer").finish_non_exhaustive()
    }
}
