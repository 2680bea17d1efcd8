//! Error types for the node state watcher binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and while the pipeline runs.

/// Top-level error for the node state watcher binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: nodestate_core::config::ConfigError,
    },

    /// Connecting to the membership feed failed.
    #[error("feed error: {source}")]
    Feed {
        /// The underlying source error.
        #[from]
        source: nodestate_core::source::SourceError,
    },

    /// The initial node listing failed or timed out.
    #[error("initial load error: {source}")]
    Load {
        /// The underlying load error.
        #[from]
        source: nodestate_core::bootstrap::LoadError,
    },

    /// The running pipeline stopped with an error.
    #[error("pipeline error: {source}")]
    Pipeline {
        /// The underlying pipeline error.
        #[from]
        source: nodestate_core::pipeline::PipelineError,
    },
}
