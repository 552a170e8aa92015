// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;

    if config.output.path == config.input.contributions {
        bail!("output.path must differ from input.contributions");
    }

    if let Some(value) = config.input.percentile {
        if value < 1.0 {
            warn!(
                percentile = value,
                "input.percentile is below 1; cohorts under 100 records will report their minimum"
            );
        }
    }

    validate_log_config(&config.log)?;
    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<()> {
    if config.contributions.is_empty() {
        bail!("input.contributions must not be empty");
    }

    match config.percentile {
        Some(value) => {
            if !(value > 0.0 && value <= 100.0) {
                bail!("input.percentile must be in (0, 100], got {}", value);
            }
        }
        None => {
            if config.percentile_file.is_empty() {
                bail!("either input.percentile or input.percentile_file must be set");
            }
        }
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<()> {
    if config.path.is_empty() {
        bail!("output.path must not be empty");
    }

    if let Some(summary) = &config.summary {
        if summary.is_empty() {
            bail!("output.summary must not be empty when set");
        }
        if summary == &config.path {
            bail!("output.summary must differ from output.path");
        }
    }

    Ok(())
}

fn validate_log_config(config: &LogConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("log.level must not be empty");
    }
    Ok(())
}
