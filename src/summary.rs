// Run summary
//
// Counters gathered while streaming, logged at the end of every run and
// optionally written out as JSON.

use anyhow::{Context, Result};
use donation_analytics_codec::RejectCounts;
use donation_analytics_core::{AggregatorStats, Percentile};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub percentile: Percentile,
    pub lines_read: u64,
    pub blank_lines: u64,
    pub records_accepted: u64,
    pub rejected: RejectCounts,
    pub non_repeat_records: u64,
    pub repeat_records: u64,
    pub invariant_violations: u64,
    pub distinct_donors: usize,
    pub cohorts: usize,
}

impl RunSummary {
    pub fn new(percentile: Percentile) -> Self {
        Self {
            percentile,
            lines_read: 0,
            blank_lines: 0,
            records_accepted: 0,
            rejected: RejectCounts::default(),
            non_repeat_records: 0,
            repeat_records: 0,
            invariant_violations: 0,
            distinct_donors: 0,
            cohorts: 0,
        }
    }

    pub(crate) fn absorb(
        &mut self,
        stats: AggregatorStats,
        distinct_donors: usize,
        cohorts: usize,
    ) {
        self.non_repeat_records = stats.non_repeat;
        self.repeat_records = stats.repeat;
        self.invariant_violations = stats.invariant_violations;
        self.distinct_donors = distinct_donors;
        self.cohorts = cohorts;
    }

    /// Rows emitted equal the number of repeat-donor records.
    pub fn rows_emitted(&self) -> u64 {
        self.repeat_records
    }

    pub fn log(&self) {
        info!(
            percentile = %self.percentile,
            lines_read = self.lines_read,
            blank_lines = self.blank_lines,
            records_accepted = self.records_accepted,
            rejected = self.rejected.total(),
            malformed_line = self.rejected.malformed_line,
            non_individual = self.rejected.non_individual,
            missing_recipient = self.rejected.missing_recipient,
            invalid_date = self.rejected.invalid_date,
            invalid_zip = self.rejected.invalid_zip,
            invalid_name = self.rejected.invalid_name,
            invalid_amount = self.rejected.invalid_amount,
            non_repeat_records = self.non_repeat_records,
            repeat_records = self.repeat_records,
            invariant_violations = self.invariant_violations,
            distinct_donors = self.distinct_donors,
            cohorts = self.cohorts,
            "Run complete"
        );
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        crate::ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self).context("Failed to encode run summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run summary: {}", path.display()))
    }
}
