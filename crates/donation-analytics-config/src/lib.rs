// donation-analytics-config - Runtime configuration for the repeat-donor pipeline
//
// Supports configuration from multiple sources:
// 1. CLI flags (highest priority, applied by the binary)
// 2. Environment variables (DONATION_ANALYTICS_* prefix)
// 3. Config file path from --config or DONATION_ANALYTICS_CONFIG
// 4. Config file contents from DONATION_ANALYTICS_CONFIG_CONTENT
// 5. Default config file location (./donation-analytics.toml)
// 6. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod env_overrides;
mod percentile;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use percentile::{parse_percentile, read_percentile_file};

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Input locations and the run-wide percentile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub contributions: String,
    pub percentile_file: String,
    /// Inline percentile; takes precedence over `percentile_file` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            contributions: "./input/itcont.txt".to_string(),
            percentile_file: "./input/percentile.txt".to_string(),
            percentile: None,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output rows file, or "-" for stdout.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

pub const STDOUT_PATH: &str = "-";

impl OutputConfig {
    pub fn is_stdout(&self) -> bool {
        self.path == STDOUT_PATH
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output/repeat_donors.txt".to_string(),
            summary: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

/// Record processing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub on_invariant_violation: ViolationPolicy,
}

/// What to do with a record that reaches the aggregator without satisfying its input contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationPolicy {
    /// Log a warning, count the record and continue.
    #[default]
    Skip,
    /// Stop the run with an error.
    Abort,
}

impl std::fmt::Display for ViolationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationPolicy::Skip => write!(f, "skip"),
            ViolationPolicy::Abort => write!(f, "abort"),
        }
    }
}

impl std::str::FromStr for ViolationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(ViolationPolicy::Skip),
            "abort" | "fail" => Ok(ViolationPolicy::Abort),
            _ => anyhow::bail!("Unsupported invariant policy: {}. Supported: skip, abort", s),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from default locations and the process environment.
    /// Call [`RuntimeConfig::validate`] once all overrides are applied.
    pub fn load() -> Result<Self> {
        sources::load_config(None)
    }

    /// Load configuration from an explicit file path (CLI --config), then apply env overrides
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_config(Some(path.as_ref()))
    }

    /// Load configuration using a caller-supplied environment (useful for testing)
    pub fn load_with_env<E: EnvSource>(path: Option<&Path>, env: &E) -> Result<Self> {
        sources::load_config_with_env(path, env)
    }

    /// Parse a TOML document on top of the built-in defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        sources::parse_toml(content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Resolve the run-wide percentile: inline value first, then the percentile file.
    pub fn resolve_percentile(&self) -> Result<donation_analytics_core::Percentile> {
        percentile::resolve(&self.input)
    }
}
