//! Streaming repeat-donor detection and per-cohort running statistics.
//!
//! Records are consumed in arrival order. A [`DonorHistoryIndex`] decides whether
//! each donor has a strictly earlier year on record; repeat contributions are
//! inserted into a [`CohortStore`] keyed by (recipient, zip5, year), which
//! reports the running nearest-rank percentile, sum and count.

pub mod aggregator;
pub mod cohort;
pub mod error;
pub mod history;
pub mod types;

pub use aggregator::{aggregate, AggregatorStats, StreamingAggregator};
pub use cohort::{CohortState, CohortStore};
pub use error::{CoreError, InvariantKind};
pub use history::DonorHistoryIndex;
pub use types::{
    Amount, CohortKey, CohortSnapshot, ContributionRecord, DonorKey, OutputRow, Percentile,
};
