// FEC individual-contribution line parsing
//
// Input lines are pipe-delimited with no header. Only six columns matter; every
// other column is ignored. A line either becomes a `ContributionRecord` or is
// rejected with a `RejectReason`.

use chrono::{Datelike, NaiveDate};
use donation_analytics_core::{Amount, ContributionRecord, DonorKey};
use serde::Serialize;
use thiserror::Error;

pub const FIELD_DELIMITER: char = '|';

pub const CMTE_ID: usize = 0;
pub const NAME: usize = 7;
pub const ZIP_CODE: usize = 10;
pub const TRANSACTION_DT: usize = 13;
pub const TRANSACTION_AMT: usize = 14;
pub const OTHER_ID: usize = 15;

/// Lines with fewer fields than this cannot carry OTHER_ID and are malformed.
pub const MIN_FIELDS: usize = OTHER_ID + 1;

const ZIP_PREFIX_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    #[error("line has fewer than 16 fields")]
    MalformedLine,
    #[error("OTHER_ID is set; not an individual contribution")]
    NonIndividual,
    #[error("CMTE_ID is empty")]
    MissingRecipient,
    #[error("NAME is empty or not in 'LAST, FIRST' form")]
    InvalidName,
    #[error("ZIP_CODE has fewer than five leading digits")]
    InvalidZip,
    #[error("TRANSACTION_DT is empty or not a valid MMDDYYYY date")]
    InvalidDate,
    #[error("TRANSACTION_AMT is empty, non-positive, or finer than cents")]
    InvalidAmount,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedLine => "malformed_line",
            Self::NonIndividual => "non_individual",
            Self::MissingRecipient => "missing_recipient",
            Self::InvalidName => "invalid_name",
            Self::InvalidZip => "invalid_zip",
            Self::InvalidDate => "invalid_date",
            Self::InvalidAmount => "invalid_amount",
        }
    }
}

/// Rejection tally for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectCounts {
    pub malformed_line: u64,
    pub non_individual: u64,
    pub missing_recipient: u64,
    pub invalid_name: u64,
    pub invalid_zip: u64,
    pub invalid_date: u64,
    pub invalid_amount: u64,
}

impl RejectCounts {
    pub fn record(&mut self, reason: RejectReason) {
        let slot = match reason {
            RejectReason::MalformedLine => &mut self.malformed_line,
            RejectReason::NonIndividual => &mut self.non_individual,
            RejectReason::MissingRecipient => &mut self.missing_recipient,
            RejectReason::InvalidName => &mut self.invalid_name,
            RejectReason::InvalidZip => &mut self.invalid_zip,
            RejectReason::InvalidDate => &mut self.invalid_date,
            RejectReason::InvalidAmount => &mut self.invalid_amount,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.malformed_line
            + self.non_individual
            + self.missing_recipient
            + self.invalid_name
            + self.invalid_zip
            + self.invalid_date
            + self.invalid_amount
    }
}

/// Parse and validate one input line.
///
/// The first failing check decides the reason, in this order: OTHER_ID,
/// CMTE_ID, TRANSACTION_DT, ZIP_CODE, NAME, TRANSACTION_AMT.
pub fn parse_line(line: &str) -> Result<ContributionRecord, RejectReason> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < MIN_FIELDS {
        return Err(RejectReason::MalformedLine);
    }

    if !fields[OTHER_ID].trim().is_empty() {
        return Err(RejectReason::NonIndividual);
    }

    let recipient_id = fields[CMTE_ID].trim();
    if recipient_id.is_empty() {
        return Err(RejectReason::MissingRecipient);
    }

    let year = parse_year(fields[TRANSACTION_DT])?;
    let zip5 = normalize_zip(fields[ZIP_CODE])?;
    let name = normalize_name(fields[NAME])?;
    let amount = parse_amount(fields[TRANSACTION_AMT])?;

    Ok(ContributionRecord::new(
        recipient_id,
        DonorKey::new(name, zip5),
        year,
        amount,
    ))
}

/// Calendar year of an `MMDDYYYY` transaction date.
pub fn parse_year(raw: &str) -> Result<i32, RejectReason> {
    let raw = raw.trim();
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectReason::InvalidDate);
    }
    NaiveDate::parse_from_str(raw, "%m%d%Y")
        .map(|date| date.year())
        .map_err(|_| RejectReason::InvalidDate)
}

pub fn normalize_zip(raw: &str) -> Result<String, RejectReason> {
    let raw = raw.trim();
    let prefix = raw.get(..ZIP_PREFIX_LEN).ok_or(RejectReason::InvalidZip)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectReason::InvalidZip);
    }
    Ok(prefix.to_string())
}

/// `"smith , jane  "` becomes `"SMITH, JANE"`.
pub fn normalize_name(raw: &str) -> Result<String, RejectReason> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [last, first] if !last.is_empty() && !first.is_empty() => Ok(format!(
            "{}, {}",
            last.to_uppercase(),
            first.to_uppercase()
        )),
        _ => Err(RejectReason::InvalidName),
    }
}

/// Decimal amount to cents. More than two fractional digits are only accepted
/// when the extra digits are zero.
pub fn parse_amount(raw: &str) -> Result<Amount, RejectReason> {
    let raw = raw.trim();
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (raw, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectReason::InvalidAmount);
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectReason::InvalidAmount);
    }

    let significant = fraction.trim_end_matches('0');
    if significant.len() > 2 {
        return Err(RejectReason::InvalidAmount);
    }

    let dollars: u64 = whole.parse().map_err(|_| RejectReason::InvalidAmount)?;
    let cents = match significant.len() {
        0 => 0,
        1 => significant.parse::<u64>().map_err(|_| RejectReason::InvalidAmount)? * 10,
        _ => significant.parse::<u64>().map_err(|_| RejectReason::InvalidAmount)?,
    };

    let total = dollars
        .checked_mul(100)
        .and_then(|c| c.checked_add(cents))
        .ok_or(RejectReason::InvalidAmount)?;
    if total == 0 {
        return Err(RejectReason::InvalidAmount);
    }
    Ok(Amount::from_cents(total))
}
