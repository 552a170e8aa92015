// Configuration source loading.
//
// Priority order:
// 1. Environment variables (DONATION_ANALYTICS_* prefix)
// 2. Explicit config file path (--config), else DONATION_ANALYTICS_CONFIG
// 3. Inline config content from DONATION_ANALYTICS_CONFIG_CONTENT
// 4. Default config file (./donation-analytics.toml)
// 5. Built-in defaults

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::RuntimeConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "./donation-analytics.toml";

/// Load configuration using the process environment.
///
/// The result is not validated: callers layer their own overrides first and
/// then call [`RuntimeConfig::validate`].
pub fn load_config(explicit_path: Option<&Path>) -> Result<RuntimeConfig> {
    load_config_with_env(explicit_path, &StdEnvSource)
}

pub fn load_config_with_env<E: EnvSource>(
    explicit_path: Option<&Path>,
    env: &E,
) -> Result<RuntimeConfig> {
    let mut config = match explicit_path {
        Some(path) => read_file(path)?,
        None => load_from_discovered(env)?.unwrap_or_default(),
    };

    env_overrides::apply_env_overrides(&mut config, env)?;
    Ok(config)
}

pub fn parse_toml(content: &str) -> Result<RuntimeConfig> {
    toml::from_str(content).context("Failed to parse TOML configuration")
}

fn load_from_discovered<E: EnvSource>(env: &E) -> Result<Option<RuntimeConfig>> {
    if let Some(path) = env.get("CONFIG") {
        return read_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        debug!("Loading inline configuration from {}CONFIG_CONTENT", ENV_PREFIX);
        let config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse inline config from {}CONFIG_CONTENT",
                ENV_PREFIX
            )
        })?;
        return Ok(Some(config));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return read_file(default_path).map(Some);
    }

    Ok(None)
}

fn read_file(path: &Path) -> Result<RuntimeConfig> {
    debug!(path = %path.display(), "Loading configuration file");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}
