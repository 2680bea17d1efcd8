//! Configuration loading and typed config structures.
//!
//! Configuration comes from an optional `nodestate-config.yaml` and is then
//! overridden by environment variables:
//!
//! - `NODESTATE_RENDERER` overrides `output.renderer`
//! - `NATS_URL` overrides `feed.nats_url`
//!
//! The renderer has no default. Leaving it unset, or naming an unknown
//! renderer, is a startup error.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::render::{RendererKind, UnknownRenderer};

/// Environment variable selecting the renderer.
pub const RENDERER_ENV_VAR: &str = "NODESTATE_RENDERER";

/// Environment variable overriding the NATS URL.
pub const NATS_URL_ENV_VAR: &str = "NATS_URL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// No renderer was selected.
    #[error("no renderer selected: set NODESTATE_RENDERER or output.renderer")]
    MissingRenderer,

    /// The selected renderer does not exist.
    #[error("invalid renderer in NODESTATE_RENDERER or output.renderer: {source}")]
    InvalidRenderer {
        /// The rejected selector.
        #[from]
        source: UnknownRenderer,
    },

    /// A duration that must be positive was zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Dotted path of the offending field.
        field: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `nodestate-config.yaml`. Every field except the
/// renderer has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NodeStateConfig {
    /// Output settings (renderer, snapshot interval).
    #[serde(default)]
    pub output: OutputConfig,

    /// Membership feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NodeStateConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults, then
    /// apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override settings from process environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override settings from an arbitrary variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(RENDERER_ENV_VAR) {
            self.output.renderer = Some(val);
        }
        if let Some(val) = lookup(NATS_URL_ENV_VAR) {
            self.feed.nats_url = val;
        }
    }

    /// Resolve the selected renderer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRenderer`] if none is selected, or
    /// [`ConfigError::InvalidRenderer`] if the name is unknown.
    pub fn renderer_kind(&self) -> Result<RendererKind, ConfigError> {
        match self.output.renderer.as_deref() {
            None | Some("") => Err(ConfigError::MissingRenderer),
            Some(name) => Ok(name.parse()?),
        }
    }

    /// Check values that cannot be expressed in the YAML types alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] for a zero interval or timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.snapshot_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "output.snapshot_interval_secs",
            });
        }
        if self.feed.initial_load_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "feed.initial_load_timeout_secs",
            });
        }
        Ok(())
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Renderer selector (`structured`, `logfmt`, `table`).
    #[serde(default)]
    pub renderer: Option<String>,

    /// Seconds between rendered snapshots.
    #[serde(default = "default_snapshot_interval_secs")]
    pub snapshot_interval_secs: u64,
}

impl OutputConfig {
    /// The snapshot interval as a [`Duration`].
    pub const fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            renderer: None,
            snapshot_interval_secs: default_snapshot_interval_secs(),
        }
    }
}

/// Membership feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Request subject answered with the full node listing.
    #[serde(default = "default_list_subject")]
    pub list_subject: String,

    /// Subject carrying node change events.
    #[serde(default = "default_events_subject")]
    pub events_subject: String,

    /// Seconds allowed for the initial listing.
    #[serde(default = "default_initial_load_timeout_secs")]
    pub initial_load_timeout_secs: u64,
}

impl FeedConfig {
    /// The initial listing deadline as a [`Duration`].
    pub const fn initial_load_timeout(&self) -> Duration {
        Duration::from_secs(self.initial_load_timeout_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            list_subject: default_list_subject(),
            events_subject: default_events_subject(),
            initial_load_timeout_secs: default_initial_load_timeout_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log line format on stderr.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Diagnostic log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

const fn default_snapshot_interval_secs() -> u64 {
    60
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_owned()
}

fn default_list_subject() -> String {
    "nodestate.nodes.list".to_owned()
}

fn default_events_subject() -> String {
    "nodestate.nodes.events".to_owned()
}

const fn default_initial_load_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn default_config_values() {
        let config = NodeStateConfig::default();
        assert_eq!(config.output.snapshot_interval(), Duration::from_secs(60));
        assert_eq!(config.feed.initial_load_timeout(), Duration::from_secs(30));
        assert_eq!(config.feed.list_subject, "nodestate.nodes.list");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
output:
  renderer: "logfmt"
  snapshot_interval_secs: 15

feed:
  nats_url: "nats://testhost:4222"
  list_subject: "cluster.nodes.list"
  events_subject: "cluster.nodes.events"
  initial_load_timeout_secs: 5

logging:
  level: "debug"
  format: "json"
"#;

        let config = NodeStateConfig::parse(yaml).ok().unwrap_or_default();

        assert_eq!(config.output.renderer.as_deref(), Some("logfmt"));
        assert_eq!(config.output.snapshot_interval_secs, 15);
        assert_eq!(config.feed.nats_url, "nats://testhost:4222");
        assert_eq!(config.feed.events_subject, "cluster.nodes.events");
        assert_eq!(config.feed.initial_load_timeout_secs, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.renderer_kind().ok(), Some(RendererKind::Logfmt));
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = NodeStateConfig::parse("output:\n  snapshot_interval_secs: 5\n")
            .ok()
            .unwrap_or_default();

        assert_eq!(config.output.snapshot_interval_secs, 5);
        assert_eq!(config.feed.initial_load_timeout_secs, 30);
        assert!(config.output.renderer.is_none());
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(
            NodeStateConfig::parse("").ok(),
            Some(NodeStateConfig::default())
        );
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = NodeStateConfig::parse("output: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_renderer_is_an_error() {
        let config = NodeStateConfig::default();
        let err = config.renderer_kind().err();
        assert!(matches!(err, Some(ConfigError::MissingRenderer)));
        assert_eq!(
            err.map(|e| e.to_string()).unwrap_or_default(),
            "no renderer selected: set NODESTATE_RENDERER or output.renderer"
        );
    }

    #[test]
    fn shipped_config_selects_no_renderer() {
        let shipped = include_str!("../../../nodestate-config.yaml");
        let config = NodeStateConfig::parse(shipped).ok().unwrap_or_default();

        assert!(config.output.renderer.is_none());
        assert!(matches!(
            config.renderer_kind(),
            Err(ConfigError::MissingRenderer)
        ));
        assert_eq!(config.output.snapshot_interval_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_renderer_is_an_error() {
        let mut config = NodeStateConfig::default();
        config.apply_overrides(env(&[(RENDERER_ENV_VAR, "csv")]));
        let err = config.renderer_kind().err();
        assert!(matches!(err, Some(ConfigError::InvalidRenderer { .. })));
        let message = err.map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("NODESTATE_RENDERER"));
        assert!(message.contains("output.renderer"));
        assert!(message.contains("csv"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = NodeStateConfig::parse("output:\n  renderer: table\n")
            .ok()
            .unwrap_or_default();
        config.apply_overrides(env(&[
            (RENDERER_ENV_VAR, "Structured"),
            (NATS_URL_ENV_VAR, "nats://feed:4222"),
        ]));

        assert_eq!(config.renderer_kind().ok(), Some(RendererKind::Structured));
        assert_eq!(config.feed.nats_url, "nats://feed:4222");
    }

    #[test]
    fn empty_renderer_counts_as_missing() {
        let mut config = NodeStateConfig::default();
        config.apply_overrides(env(&[(RENDERER_ENV_VAR, "")]));
        assert!(matches!(
            config.renderer_kind(),
            Err(ConfigError::MissingRenderer)
        ));
    }

    #[test]
    fn zero_interval_fails_validation() {
        let config = NodeStateConfig::parse("output:\n  snapshot_interval_secs: 0\n")
            .ok()
            .unwrap_or_default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroDuration {
                field: "output.snapshot_interval_secs"
            })
        ));
    }
}
