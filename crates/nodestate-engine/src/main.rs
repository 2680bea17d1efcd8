//! Node state watcher binary.
//!
//! This is the main entry point that wires the NATS membership feed, the
//! node-state store, the snapshot scheduler and the selected renderer
//! together, then runs until SIGINT or SIGTERM.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `nodestate-config.yaml` and the environment
//! 2. Initialize structured logging (tracing, on stderr)
//! 3. Resolve the renderer selection
//! 4. Connect to NATS and subscribe to node events
//! 5. Load the initial node listing into the store
//! 6. Install the shutdown signal listener
//! 7. Run the pipeline until shutdown or failure
//! 8. Log the result

mod error;
mod nats_feed;

use std::path::Path;
use std::sync::Arc;

use nodestate_core::bootstrap;
use nodestate_core::config::{LogFormat, LoggingConfig, NodeStateConfig};
use nodestate_core::pipeline::Pipeline;
use nodestate_core::store::NodeStateStore;
use nodestate_render::NodeRenderer;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::nats_feed::NatsMembershipSource;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "nodestate-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the initial load, the feed or a
/// render fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Failures are logged with default settings.
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            report_config_error(&e);
            return Err(e.into());
        }
    };

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("nodestate-engine starting");

    if let Err(e) = run(config).await {
        error!(error = %e, "nodestate-engine failed");
        return Err(e.into());
    }

    info!("nodestate-engine shutdown complete");
    Ok(())
}

async fn run(config: NodeStateConfig) -> Result<(), EngineError> {
    // 3. Resolve the renderer.
    let kind = config.renderer_kind()?;
    info!(
        renderer = %kind,
        snapshot_interval_secs = config.output.snapshot_interval_secs,
        nats_url = config.feed.nats_url,
        "Configuration loaded"
    );

    // 4. Connect to NATS. Events buffer from here, before the listing.
    let source = Arc::new(NatsMembershipSource::connect(&config.feed).await?);
    info!(
        list_subject = config.feed.list_subject,
        events_subject = config.feed.events_subject,
        "NATS membership feed connected"
    );

    // 5. Initial load.
    let store = Arc::new(NodeStateStore::new());
    bootstrap::initial_load(
        source.as_ref(),
        &store,
        config.feed.initial_load_timeout(),
    )
    .await?;

    // 6. Shutdown signals.
    let pipeline = Pipeline::new(
        store,
        Box::new(NodeRenderer::stdout(kind)),
        config.output.snapshot_interval(),
    );
    spawn_shutdown_listener(pipeline.shutdown_token());

    // 7. Run until shutdown.
    let summary = pipeline.run(source).await?;

    // 8. Log results.
    info!(
        snapshots_rendered = summary.snapshots_rendered,
        nodes_added = summary.events.added,
        nodes_updated = summary.events.updated,
        nodes_deleted = summary.events.deleted,
        "Pipeline finished"
    );
    Ok(())
}

/// Load configuration from `nodestate-config.yaml` plus environment
/// overrides, falling back to defaults when the file is absent.
fn load_config() -> Result<NodeStateConfig, EngineError> {
    let config = NodeStateConfig::load_or_default(Path::new(CONFIG_PATH))?;
    config.validate()?;
    Ok(config)
}

fn report_config_error(e: &EngineError) {
    error!(error = %e, "failed to load configuration");
}

/// Log to stderr so stdout carries only rendered snapshots.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
fn spawn_shutdown_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutting down");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "failed to install signal handlers, falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received interrupt signal");
}
