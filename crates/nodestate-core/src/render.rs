//! Renderer contract.
//!
//! The scheduler hands every [`Snapshot`] to a [`Renderer`]. Concrete
//! renderers live in `nodestate-render`; this module defines the trait they
//! implement, the closed set of renderer names, and the error they report.

use std::fmt;
use std::str::FromStr;

use crate::store::Snapshot;

/// Errors a renderer can report. Any of them is fatal to the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing the rendered output failed.
    #[error("write failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A record could not be encoded.
    #[error("encode failed: {message}")]
    Encode {
        /// Description of the encoding failure.
        message: String,
    },
}

/// An output strategy for snapshots.
///
/// Implementations must not assume anything about the previous snapshot:
/// which optional fields or columns appear is derived from scratch on every
/// call.
pub trait Renderer: Send {
    /// The renderer's configured name.
    fn kind(&self) -> RendererKind;

    /// Render one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the output could not be produced.
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError>;
}

/// The closed set of renderers selectable at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// One JSON event per node.
    Structured,
    /// One `key=value` line per node.
    Logfmt,
    /// A box-drawn table of all nodes.
    Table,
}

impl RendererKind {
    /// Every selectable renderer.
    pub const ALL: [Self; 3] = [Self::Structured, Self::Logfmt, Self::Table];

    /// The canonical selector string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Logfmt => "logfmt",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a selector names no known renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown renderer {value:?} (expected one of: structured, logfmt, table)")]
pub struct UnknownRenderer {
    /// The rejected selector.
    pub value: String,
}

impl FromStr for RendererKind {
    type Err = UnknownRenderer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(Self::Structured),
            "logfmt" => Ok(Self::Logfmt),
            "table" => Ok(Self::Table),
            _ => Err(UnknownRenderer {
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_is_case_insensitive() {
        assert_eq!("TABLE".parse(), Ok(RendererKind::Table));
        assert_eq!("LogFmt".parse(), Ok(RendererKind::Logfmt));
        assert_eq!(" structured ".parse(), Ok(RendererKind::Structured));
    }

    #[test]
    fn json_is_an_alias_for_structured() {
        assert_eq!("json".parse(), Ok(RendererKind::Structured));
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let err = "yaml".parse::<RendererKind>().err();
        assert_eq!(
            err,
            Some(UnknownRenderer {
                value: String::from("yaml")
            })
        );
    }

    #[test]
    fn canonical_names_round_trip() {
        for kind in RendererKind::ALL {
            assert_eq!(kind.as_str().parse(), Ok(kind));
        }
    }
}
