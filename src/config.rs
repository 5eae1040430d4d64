//! Monitor configuration loading.
//!
//! Values are layered: built-in defaults, then an optional TOML file named by
//! `DMM_CONFIG`, then `DMM_*` environment variables. A malformed config file
//! is an error; invalid environment values fall back to the layer below
//! without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `DMM_CONFIG` | unset | Path to a TOML config file |
//! | `DMM_MODEL_NAME` | myModel | Model under observation |
//! | `DMM_MODEL_VERSION` | 1 | Model version (informational) |
//! | `DMM_NODE_COUNT` | 3 | Nodes assembled by the CLI (1..=1024) |
//! | `DMM_MIN_ACCURACY` | 0.9 | Exclusive accuracy lower bound |
//! | `DMM_MAX_LOSS` | 0.1 | Exclusive loss upper bound |
//! | `DMM_NOTIFY_SCOPE` | all | `all` or `exclude-origin` |
//! | `DMM_LOG_FORMAT` | json | `json` or `pretty` |
//! | `DMM_LOG_LEVEL` | info | Tracing filter directive |
//! | `DMM_LOG_FILE` | unset | Log file path (stderr if unset) |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::NotifyScope;
use crate::policy::ValidityPolicy;
use crate::telemetry::{LogConfig, LogFormat};

/// Environment variable naming the TOML config file.
pub const CONFIG_FILE_VAR: &str = "DMM_CONFIG";

/// Upper bound on nodes assembled from configuration.
pub const MAX_NODES: usize = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// `[model]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub version: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "myModel".to_string(),
            version: 1,
        }
    }
}

/// `[network]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub node_count: usize,
    pub notify_scope: NotifyScope,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 3,
            notify_scope: NotifyScope::AllMembers,
        }
    }
}

/// All monitor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub model: ModelConfig,
    pub network: NetworkConfig,
    pub policy: ValidityPolicy,
    pub log: LogConfig,
}

/// Flat summary of effective values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub model_name: String,
    pub model_version: u32,
    pub node_count: usize,
    pub notify_scope: &'static str,
    pub min_accuracy: f64,
    pub max_loss: f64,
    pub log_format: &'static str,
    pub log_level: String,
    pub log_file: Option<String>,
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a finite `f64` env var.
fn parse_f64(key: &str) -> Option<f64> {
    parse_env::<f64>(key).filter(|v| v.is_finite())
}

/// Load configuration from the optional file and the environment.
pub fn load() -> Result<EnvConfig, ConfigError> {
    let base = match non_empty_env(CONFIG_FILE_VAR) {
        Some(path) => load_file(Path::new(&path))?,
        None => EnvConfig::default(),
    };
    Ok(apply_env(base))
}

/// Parse and validate a TOML config file. Missing keys take defaults.
pub fn load_file(path: &Path) -> Result<EnvConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EnvConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Overlay `DMM_*` environment variables onto `config`.
pub fn apply_env(mut config: EnvConfig) -> EnvConfig {
    if let Some(name) = non_empty_env("DMM_MODEL_NAME") {
        config.model.name = name;
    }
    if let Some(version) = parse_env::<u32>("DMM_MODEL_VERSION") {
        config.model.version = version;
    }
    if let Some(count) = parse_env::<usize>("DMM_NODE_COUNT") {
        config.network.node_count = count.clamp(1, MAX_NODES);
    }
    if let Some(scope) = std::env::var("DMM_NOTIFY_SCOPE")
        .ok()
        .and_then(|v| NotifyScope::parse(&v))
    {
        config.network.notify_scope = scope;
    }
    if let Some(min_accuracy) = parse_f64("DMM_MIN_ACCURACY") {
        config.policy.min_accuracy = min_accuracy.clamp(0.0, 1.0);
    }
    if let Some(max_loss) = parse_f64("DMM_MAX_LOSS") {
        config.policy.max_loss = max_loss.max(0.0);
    }
    if let Some(format) = std::env::var("DMM_LOG_FORMAT")
        .ok()
        .and_then(|v| LogFormat::parse(&v))
    {
        config.log.format = format;
    }
    if let Some(level) = non_empty_env("DMM_LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(file) = non_empty_env("DMM_LOG_FILE") {
        config.log.output_path = Some(PathBuf::from(file));
    }
    config
}

impl EnvConfig {
    /// Reject values a config file may set but the monitor cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::Invalid("model.name must not be empty".into()));
        }
        if !(1..=MAX_NODES).contains(&self.network.node_count) {
            return Err(ConfigError::Invalid(format!(
                "network.node_count must be in 1..={}, got {}",
                MAX_NODES, self.network.node_count
            )));
        }
        let min_accuracy = self.policy.min_accuracy;
        if !min_accuracy.is_finite() || !(0.0..=1.0).contains(&min_accuracy) {
            return Err(ConfigError::Invalid(format!(
                "policy.min_accuracy must be in [0, 1], got {}",
                min_accuracy
            )));
        }
        let max_loss = self.policy.max_loss;
        if !max_loss.is_finite() || max_loss < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "policy.max_loss must be >= 0, got {}",
                max_loss
            )));
        }
        Ok(())
    }

    /// Return a flat summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            model_name: self.model.name.clone(),
            model_version: self.model.version,
            node_count: self.network.node_count,
            notify_scope: self.network.notify_scope.as_str(),
            min_accuracy: self.policy.min_accuracy,
            max_loss: self.policy.max_loss,
            log_format: self.log.format.as_str(),
            log_level: self.log.level.clone(),
            log_file: self
                .log
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}
