//! logfmt renderer: one `key=value` line per node.
//!
//! Address keys appear only for roles the node reports. `taints` is left
//! out entirely for an untainted node, while `conditions` is always written,
//! empty when nothing is asserted.

use std::fmt::Write as _;
use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use nodestate_core::render::{RenderError, Renderer, RendererKind};
use nodestate_core::store::Snapshot;
use nodestate_types::{AddressRole, NodeRecord};
use tracing::trace;

use crate::columns;

/// Writes each node as a logfmt line.
pub struct LogfmtRenderer {
    out: Box<dyn Write + Send>,
}

impl LogfmtRenderer {
    /// Render to stdout.
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Render to `out`.
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Format `snapshot` as it would be rendered at `now`.
    pub fn format(snapshot: &Snapshot, now: DateTime<Utc>) -> String {
        let ts = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut text = String::new();
        for node in snapshot.iter() {
            push_line(&mut text, node, &ts);
        }
        text
    }
}

fn push_line(text: &mut String, node: &NodeRecord, ts: &str) {
    push_pair(text, "ts", ts);
    push_pair(text, "level", "info");

    for role in AddressRole::ALL {
        if let Some(address) = node.address(role) {
            push_pair(text, columns::logfmt_key(role), address);
        }
    }

    let conditions: Vec<&str> = node.true_conditions().collect();
    push_pair(text, "conditions", &conditions.join(","));

    if !node.taints.is_empty() {
        let taints: Vec<String> = node.taint_labels().collect();
        push_pair(text, "taints", &taints.join(","));
    }

    text.push('\n');
}

fn push_pair(text: &mut String, key: &str, value: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push(' ');
    }
    text.push_str(key);
    text.push('=');
    if needs_quotes(value) {
        push_quoted(text, value);
    } else {
        text.push_str(value);
    }
}

fn needs_quotes(value: &str) -> bool {
    value
        .chars()
        .any(|c| c == ' ' || c == '=' || c == '"' || c.is_control())
}

fn push_quoted(text: &mut String, value: &str) {
    text.push('"');
    for c in value.chars() {
        match c {
            '"' => text.push_str("\\\""),
            '\\' => text.push_str("\\\\"),
            '\n' => text.push_str("\\n"),
            '\r' => text.push_str("\\r"),
            '\t' => text.push_str("\\t"),
            c if c.is_control() => {
                // Writing to a String cannot fail.
                let _ = write!(text, "\\u{:04x}", u32::from(c));
            }
            c => text.push(c),
        }
    }
    text.push('"');
}

impl Renderer for LogfmtRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Logfmt
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let text = Self::format(snapshot, Utc::now());
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        trace!(nodes = snapshot.len(), "logfmt snapshot written");
        Ok(())
    }
}

impl std::fmt::Debug for LogfmtRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogfmtRenderer").finish_non_exhaustive()
    }
}
