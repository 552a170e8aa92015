// Core record and key types shared by the history index, cohort store and aggregator.

use serde::Serialize;
use std::fmt;

use crate::error::CoreError;

/// Monetary amount in cents.
///
/// Amounts are carried as integer cents so that running sums stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars * 100)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whole currency units, rounding half up (`x.50` becomes `x + 1`).
    pub fn round_to_dollars(self) -> u64 {
        self.0 / 100 + u64::from(self.0 % 100 >= 50)
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

// Whole amounts print without a fractional part, everything else with two digits.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = self.0 / 100;
        let cents = self.0 % 100;
        if cents == 0 {
            write!(f, "{}", dollars)
        } else {
            write!(f, "{}.{:02}", dollars, cents)
        }
    }
}

/// Fixed-point resolution of a percentile: millionths of a percent.
const PERCENTILE_SCALE: u64 = 1_000_000;

/// Target percentile for the whole run, in the half-open range (0, 100].
///
/// Held as an integer count of millionths of a percent so nearest-rank
/// selection is computed exactly. Finer inputs are rounded to that resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentile(u64);

impl Percentile {
    pub fn new(value: f64) -> Result<Self, CoreError> {
        if !(value.is_finite() && value > 0.0 && value <= 100.0) {
            return Err(CoreError::InvalidPercentile { value });
        }
        let scaled = (value * PERCENTILE_SCALE as f64).round() as u64;
        if scaled == 0 || scaled > 100 * PERCENTILE_SCALE {
            return Err(CoreError::InvalidPercentile { value });
        }
        Ok(Self(scaled))
    }

    pub fn value(self) -> f64 {
        self.0 as f64 / PERCENTILE_SCALE as f64
    }

    /// Nearest rank (1-indexed) in a sorted population of `n` elements:
    /// `ceil(n * p / 100)`, clamped to `[1, n]`.
    ///
    /// Returns 0 only for an empty population.
    pub fn nearest_rank(self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let denominator = u128::from(100 * PERCENTILE_SCALE);
        let rank = (n as u128 * u128::from(self.0)).div_ceil(denominator);
        usize::try_from(rank).unwrap_or(n).clamp(1, n)
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for Percentile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

/// Donor identity for repeat detection: normalized full name plus ZIP prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DonorKey {
    pub name: String,
    pub zip5: String,
}

impl DonorKey {
    pub fn new(name: impl Into<String>, zip5: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zip5: zip5.into(),
        }
    }
}

/// A validated individual contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionRecord {
    pub recipient_id: String,
    pub donor_key: DonorKey,
    pub year: i32,
    pub amount: Amount,
}

impl ContributionRecord {
    pub fn new(
        recipient_id: impl Into<String>,
        donor_key: DonorKey,
        year: i32,
        amount: Amount,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            donor_key,
            year,
            amount,
        }
    }

    pub fn cohort_key(&self) -> CohortKey {
        CohortKey {
            recipient_id: self.recipient_id.clone(),
            zip5: self.donor_key.zip5.clone(),
            year: self.year,
        }
    }
}

/// One running-statistics cohort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CohortKey {
    pub recipient_id: String,
    pub zip5: String,
    pub year: i32,
}

/// Result of inserting into a cohort: the rounded percentile, running sum and count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortSnapshot {
    pub percentile_value: u64,
    pub sum: Amount,
    pub count: u64,
}

/// One emitted line, produced for every repeat-donor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub recipient_id: String,
    pub zip5: String,
    pub year: i32,
    pub percentile_value: u64,
    pub sum_so_far: Amount,
    pub count_so_far: u64,
}

impl OutputRow {
    pub fn new(key: CohortKey, snapshot: CohortSnapshot) -> Self {
        Self {
            recipient_id: key.recipient_id,
            zip5: key.zip5,
            year: key.year,
            percentile_value: snapshot.percentile_value,
            sum_so_far: snapshot.sum,
            count_so_far: snapshot.count,
        }
    }
}
