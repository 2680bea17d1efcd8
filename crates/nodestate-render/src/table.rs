//! Table renderer: a timestamp line followed by a box-drawn table.
//!
//! ```text
//! Nodes at 2026-10-18T14:00:00+02:00:
//! ┌──────────┬─────────────┬────────────┬────────────────┐
//! │ Hostname │ Internal IP │ Conditions │ Taints         │
//! ├──────────┼─────────────┼────────────┼────────────────┤
//! │ node-1   │ 10.0.0.1    │ Ready      │ dedicated: gpu │
//! │          │             │            │ spot: true     │
//! ├──────────┼─────────────┼────────────┼────────────────┤
//! │ Total    │ 1           │            │                │
//! └──────────┴─────────────┴────────────┴────────────────┘
//! ```
//!
//! Address columns appear only for roles at least one node reports.

use std::io::{self, Write};

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use nodestate_core::render::{RenderError, Renderer, RendererKind};
use nodestate_core::store::Snapshot;
use tracing::trace;

use crate::columns;

/// Placeholder for a role the node does not report.
const ABSENT: &str = "-";

/// Writes the whole snapshot as one table.
pub struct TableRenderer {
    out: Box<dyn Write + Send>,
}

impl TableRenderer {
    /// Render to stdout.
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Render to `out`.
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Format `snapshot` as it would be rendered at `now`.
    pub fn format(snapshot: &Snapshot, now: DateTime<FixedOffset>) -> String {
        let roles = columns::present_roles(snapshot);

        let mut header = vec![String::from("Hostname")];
        header.extend(roles.iter().map(|&role| columns::heading(role).to_owned()));
        header.extend([String::from("Conditions"), String::from("Taints")]);

        let rows: Vec<Vec<String>> = snapshot
            .iter()
            .map(|node| {
                let mut row = vec![node.name.clone()];
                row.extend(
                    roles
                        .iter()
                        .map(|&role| node.address(role).unwrap_or(ABSENT).to_owned()),
                );
                row.push(node.true_conditions().collect::<Vec<_>>().join(","));
                row.push(node.taint_labels().collect::<Vec<_>>().join("\n"));
                row
            })
            .collect();

        let mut footer = vec![String::from("Total"), snapshot.len().to_string()];
        footer.resize(header.len(), String::new());

        let grid = Grid::new(header, rows, footer);
        format!(
            "Nodes at {}:\n{}",
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
            grid.draw()
        )
    }
}

impl Renderer for TableRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Table
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let text = Self::format(snapshot, Local::now().fixed_offset());
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        trace!(nodes = snapshot.len(), "table snapshot written");
        Ok(())
    }
}

impl std::fmt::Debug for TableRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRenderer").finish_non_exhaustive()
    }
}

/// Cells laid out in columns. A cell may span several lines.
struct Grid {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    footer: Vec<String>,
    widths: Vec<usize>,
}

impl Grid {
    fn new(header: Vec<String>, rows: Vec<Vec<String>>, footer: Vec<String>) -> Self {
        let mut widths: Vec<usize> = header.iter().map(|cell| cell_width(cell)).collect();
        for row in rows.iter().chain(std::iter::once(&footer)) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell_width(cell));
            }
        }
        Self {
            header,
            rows,
            footer,
            widths,
        }
    }

    fn draw(&self) -> String {
        let mut out = self.rule('┌', '┬', '┐');
        self.push_row(&mut out, &self.header);
        out.push_str(&self.rule('├', '┼', '┤'));
        for row in &self.rows {
            self.push_row(&mut out, row);
        }
        out.push_str(&self.rule('├', '┼', '┤'));
        self.push_row(&mut out, &self.footer);
        out.push_str(&self.rule('└', '┴', '┘'));
        out
    }

    fn rule(&self, left: char, cross: char, right: char) -> String {
        let segments: Vec<String> = self
            .widths
            .iter()
            .map(|w| "─".repeat(w.saturating_add(2)))
            .collect();
        format!("{left}{}{right}\n", segments.join(&cross.to_string()))
    }

    fn push_row(&self, out: &mut String, row: &[String]) {
        let height = row.iter().map(|cell| cell.lines().count()).max().unwrap_or(0).max(1);
        for line in 0..height {
            out.push('│');
            for (cell, &width) in row.iter().zip(&self.widths) {
                let text = cell.lines().nth(line).unwrap_or("");
                out.push_str(&format!(" {text:<width$} │"));
            }
            out.push('\n');
        }
    }
}

fn cell_width(cell: &str) -> usize {
    cell.lines().map(|line| line.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nodestate_types::{AddressRole, ConditionStatus, NodeRecord};

    use super::*;

    fn at_noon() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-18T14:00:00+02:00").unwrap()
    }

    #[test]
    fn empty_snapshot_has_only_fixed_columns() {
        let text = TableRenderer::format(&Snapshot::default(), at_noon());

        assert_eq!(
            text,
            "Nodes at 2026-10-18T14:00:00+02:00:\n\
             ┌──────────┬────────────┬────────┐\n\
             │ Hostname │ Conditions │ Taints │\n\
             ├──────────┼────────────┼────────┤\n\
             ├──────────┼────────────┼────────┤\n\
             │ Total    │ 0          │        │\n\
             └──────────┴────────────┴────────┘\n"
        );
    }

    #[test]
    fn sparse_roles_get_placeholders() {
        let snapshot = Snapshot::from_records([
            NodeRecord::new("node-1").with_address(AddressRole::InternalIp, "10.0.0.1"),
            NodeRecord::new("node-2").with_address(AddressRole::ExternalDns, "n2.example.com"),
        ]);

        let text = TableRenderer::format(&snapshot, at_noon());

        assert_eq!(
            text,
            "Nodes at 2026-10-18T14:00:00+02:00:\n\
             ┌──────────┬─────────────┬───────────────────┬────────────┬────────┐\n\
             │ Hostname │ Internal IP │ External DNS Name │ Conditions │ Taints │\n\
             ├──────────┼─────────────┼───────────────────┼────────────┼────────┤\n\
             │ node-1   │ 10.0.0.1    │ -                 │            │        │\n\
             │ node-2   │ -           │ n2.example.com    │            │        │\n\
             ├──────────┼─────────────┼───────────────────┼────────────┼────────┤\n\
             │ Total    │ 2           │                   │            │        │\n\
             └──────────┴─────────────┴───────────────────┴────────────┴────────┘\n"
        );
    }

    #[test]
    fn taints_stack_inside_one_cell() {
        let snapshot = Snapshot::from_records([NodeRecord::new("node-1")
            .with_condition("Ready", ConditionStatus::True)
            .with_condition("DiskPressure", ConditionStatus::False)
            .with_taint("dedicated", "gpu")
            .with_taint("spot", "true")]);

        let text = TableRenderer::format(&snapshot, at_noon());

        assert_eq!(
            text,
            "Nodes at 2026-10-18T14:00:00+02:00:\n\
             ┌──────────┬────────────┬────────────────┐\n\
             │ Hostname │ Conditions │ Taints         │\n\
             ├──────────┼────────────┼────────────────┤\n\
             │ node-1   │ Ready      │ dedicated: gpu │\n\
             │          │            │ spot: true     │\n\
             ├──────────┼────────────┼────────────────┤\n\
             │ Total    │ 1          │                │\n\
             └──────────┴────────────┴────────────────┘\n"
        );
    }
}
