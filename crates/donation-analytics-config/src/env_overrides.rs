use super::{LogFormat, RuntimeConfig, ViolationPolicy};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "DONATION_ANALYTICS_";

/// Abstraction over environment-variable lookups so tests can supply their own
/// source of overrides instead of mutating the process environment.
pub trait EnvSource {
    /// Get a variable by its key without the DONATION_ANALYTICS_ prefix.
    fn get(&self, key: &str) -> Option<String>;
}

impl EnvSource for std::collections::HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        std::collections::HashMap::get(self, key).cloned()
    }
}

/// Apply environment-variable overrides (above file, below CLI) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Input
    if let Some(path) = get_env_string(env, "INPUT_PATH") {
        config.input.contributions = path;
    }
    if let Some(path) = get_env_string(env, "PERCENTILE_PATH") {
        config.input.percentile_file = path;
    }
    if let Some(value) = get_env_f64(env, "PERCENTILE")? {
        config.input.percentile = Some(value);
    }

    // Output
    if let Some(path) = get_env_string(env, "OUTPUT_PATH") {
        config.output.path = path;
    }
    if let Some(path) = get_env_string(env, "SUMMARY_PATH") {
        config.output.summary = if path.is_empty() { None } else { Some(path) };
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid DONATION_ANALYTICS_LOG_FORMAT value")?;
    }

    // Processing
    if let Some(policy) = get_env_string(env, "ON_INVARIANT_VIOLATION") {
        config.processing.on_invariant_violation = policy
            .parse::<ViolationPolicy>()
            .context("Invalid DONATION_ANALYTICS_ON_INVARIANT_VIOLATION value")?;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

fn get_env_f64<E: EnvSource>(env: &E, key: &str) -> Result<Option<f64>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<f64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
