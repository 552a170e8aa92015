//! Record codec for donation-analytics.
//!
//! Parses FEC pipe-delimited contribution lines into validated
//! [`ContributionRecord`](donation_analytics_core::ContributionRecord)s and
//! encodes output rows back to the same delimited format.

pub mod parse;
pub mod write;

pub use parse::{
    normalize_name, normalize_zip, parse_amount, parse_line, parse_year, RejectCounts,
    RejectReason,
};
pub use write::{format_row, PipeWriter, RowSink};
