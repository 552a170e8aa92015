// Output encoding for repeat-donor rows
//
// Row layout: CMTE_ID|ZIP|YEAR|PERCENTILE|SUM|COUNT

use std::io::{self, Write};

use donation_analytics_core::OutputRow;

use crate::parse::FIELD_DELIMITER;

/// Destination for emitted rows. Rows arrive in input order.
pub trait RowSink {
    fn emit(&mut self, row: &OutputRow) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl RowSink for Vec<OutputRow> {
    fn emit(&mut self, row: &OutputRow) -> io::Result<()> {
        self.push(row.clone());
        Ok(())
    }
}

/// Writes pipe-delimited rows, one per line.
pub struct PipeWriter<W: Write> {
    inner: W,
    rows_written: u64,
}

impl<W: Write> PipeWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            rows_written: 0,
        }
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> RowSink for PipeWriter<W> {
    fn emit(&mut self, row: &OutputRow) -> io::Result<()> {
        writeln!(self.inner, "{}", format_row(row))?;
        self.rows_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

pub fn format_row(row: &OutputRow) -> String {
    let d = FIELD_DELIMITER;
    format!(
        "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
        row.recipient_id,
        row.zip5,
        row.year,
        row.percentile_value,
        row.sum_so_far,
        row.count_so_far,
    )
}
