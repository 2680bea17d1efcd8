//! Concrete snapshot renderers for the node state watcher.
//!
//! Each renderer implements [`Renderer`] and writes to stdout unless given
//! another writer. [`NodeRenderer`] is the closed set selected once at
//! startup from a [`RendererKind`].
//!
//! # Modules
//!
//! - [`structured`] -- One JSON event per node.
//! - [`logfmt`] -- One `key=value` line per node.
//! - [`table`] -- A box-drawn table of the whole snapshot.

mod columns;
pub mod logfmt;
pub mod structured;
pub mod table;

use std::io::Write;

use nodestate_core::render::{RenderError, Renderer, RendererKind};
use nodestate_core::store::Snapshot;

pub use logfmt::LogfmtRenderer;
pub use structured::StructuredRenderer;
pub use table::TableRenderer;

/// The renderer chosen at startup.
#[derive(Debug)]
pub enum NodeRenderer {
    /// JSON events.
    Structured(StructuredRenderer),
    /// logfmt lines.
    Logfmt(LogfmtRenderer),
    /// Box-drawn table.
    Table(TableRenderer),
}

impl NodeRenderer {
    /// The renderer for `kind`, writing to stdout.
    pub fn stdout(kind: RendererKind) -> Self {
        match kind {
            RendererKind::Structured => Self::Structured(StructuredRenderer::stdout()),
            RendererKind::Logfmt => Self::Logfmt(LogfmtRenderer::stdout()),
            RendererKind::Table => Self::Table(TableRenderer::stdout()),
        }
    }

    /// The renderer for `kind`, writing to `out`.
    pub fn with_writer(kind: RendererKind, out: Box<dyn Write + Send>) -> Self {
        match kind {
            RendererKind::Structured => Self::Structured(StructuredRenderer::with_writer(out)),
            RendererKind::Logfmt => Self::Logfmt(LogfmtRenderer::with_writer(out)),
            RendererKind::Table => Self::Table(TableRenderer::with_writer(out)),
        }
    }
}

impl Renderer for NodeRenderer {
    fn kind(&self) -> RendererKind {
        match self {
            Self::Structured(r) => r.kind(),
            Self::Logfmt(r) => r.kind(),
            Self::Table(r) => r.kind(),
        }
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        match self {
            Self::Structured(r) => r.render(snapshot),
            Self::Logfmt(r) => r.render(snapshot),
            Self::Table(r) => r.render(snapshot),
        }
    }
}
