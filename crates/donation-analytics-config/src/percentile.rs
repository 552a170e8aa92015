// Percentile resolution
//
// The percentile is read once before any record is processed. An inline value
// wins; otherwise the file is read and its trimmed contents parsed as a number.

use crate::InputConfig;
use anyhow::{Context, Result};
use donation_analytics_core::Percentile;
use std::path::Path;
use tracing::debug;

pub(crate) fn resolve(input: &InputConfig) -> Result<Percentile> {
    match input.percentile {
        Some(value) => Percentile::new(value).context("Invalid input.percentile"),
        None => read_percentile_file(&input.percentile_file),
    }
}

pub fn read_percentile_file(path: impl AsRef<Path>) -> Result<Percentile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read percentile file: {}", path.display()))?;
    let percentile = parse_percentile(&content)
        .with_context(|| format!("Invalid percentile in {}", path.display()))?;
    debug!(path = %path.display(), %percentile, "Loaded percentile");
    Ok(percentile)
}

pub fn parse_percentile(content: &str) -> Result<Percentile> {
    let trimmed = content.trim();
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("'{}' is not a number", trimmed))?;
    Ok(Percentile::new(value)?)
}
