use thiserror::Error;

/// Errors raised by the aggregation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The run-wide percentile is outside (0, 100]. Fatal before any record is processed.
    #[error("percentile {value} is outside the range (0, 100]")]
    InvalidPercentile { value: f64 },

    /// A record reached the core without satisfying the validated-input contract.
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: InvariantKind },

    #[error("running sum overflowed for cohort {recipient_id}|{zip5}|{year}")]
    SumOverflow {
        recipient_id: String,
        zip5: String,
        year: i32,
    },
}

impl CoreError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidPercentile { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantKind {
    #[error("amount must be strictly positive")]
    NonPositiveAmount,
    #[error("recipient id is empty")]
    EmptyRecipient,
    #[error("donor name is empty")]
    EmptyDonorName,
    #[error("zip prefix must be exactly five characters")]
    BadZipPrefix,
}
