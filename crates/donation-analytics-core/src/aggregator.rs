// Streaming aggregator
//
// Drives the donor history index and the cohort store one record at a time.
// Each call to `process` finishes its emission before the next record is accepted.

use serde::Serialize;
use tracing::trace;

use crate::cohort::CohortStore;
use crate::error::{CoreError, InvariantKind};
use crate::history::DonorHistoryIndex;
use crate::types::{ContributionRecord, OutputRow, Percentile};

/// Per-run counters kept by the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregatorStats {
    pub records_seen: u64,
    pub non_repeat: u64,
    pub repeat: u64,
    pub invariant_violations: u64,
}

#[derive(Debug)]
pub struct StreamingAggregator {
    percentile: Percentile,
    history: DonorHistoryIndex,
    cohorts: CohortStore,
    stats: AggregatorStats,
}

impl StreamingAggregator {
    pub fn new(percentile: Percentile) -> Self {
        Self {
            percentile,
            history: DonorHistoryIndex::new(),
            cohorts: CohortStore::new(),
            stats: AggregatorStats::default(),
        }
    }

    pub fn percentile(&self) -> Percentile {
        self.percentile
    }

    /// Process one validated record.
    ///
    /// Returns the output row for a repeat-donor record and `None` otherwise.
    /// A record that breaks the input contract is rejected before either store
    /// is touched.
    pub fn process(
        &mut self,
        record: &ContributionRecord,
    ) -> Result<Option<OutputRow>, CoreError> {
        self.stats.records_seen += 1;
        if let Err(reason) = check_invariants(record) {
            self.stats.invariant_violations += 1;
            return Err(CoreError::InvariantViolation { reason });
        }

        if !self.history.observe(&record.donor_key, record.year) {
            self.stats.non_repeat += 1;
            return Ok(None);
        }

        let key = record.cohort_key();
        let snapshot = self
            .cohorts
            .insert_and_query(&key, record.amount, self.percentile)?;
        self.stats.repeat += 1;

        trace!(
            recipient_id = %key.recipient_id,
            zip5 = %key.zip5,
            year = key.year,
            count = snapshot.count,
            "repeat donor contribution"
        );

        Ok(Some(OutputRow::new(key, snapshot)))
    }

    pub fn stats(&self) -> AggregatorStats {
        self.stats
    }

    pub fn distinct_donors(&self) -> usize {
        self.history.len()
    }

    pub fn cohort_count(&self) -> usize {
        self.cohorts.len()
    }

    pub fn history(&self) -> &DonorHistoryIndex {
        &self.history
    }

    pub fn cohorts(&self) -> &CohortStore {
        &self.cohorts
    }
}

fn check_invariants(record: &ContributionRecord) -> Result<(), InvariantKind> {
    if !record.amount.is_positive() {
        return Err(InvariantKind::NonPositiveAmount);
    }
    if record.recipient_id.is_empty() {
        return Err(InvariantKind::EmptyRecipient);
    }
    if record.donor_key.name.is_empty() {
        return Err(InvariantKind::EmptyDonorName);
    }
    if record.donor_key.zip5.chars().count() != 5 {
        return Err(InvariantKind::BadZipPrefix);
    }
    Ok(())
}

/// Run a finite sequence of records through a fresh aggregator and collect the rows.
pub fn aggregate<I>(percentile: Percentile, records: I) -> Result<Vec<OutputRow>, CoreError>
where
    I: IntoIterator<Item = ContributionRecord>,
{
    let mut aggregator = StreamingAggregator::new(percentile);
    let mut rows = Vec::new();
    for record in records {
        if let Some(row) = aggregator.process(&record)? {
            rows.push(row);
        }
    }
    Ok(rows)
}
