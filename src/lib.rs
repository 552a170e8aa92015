// donation-analytics - Repeat-donor streaming pipeline
//
// Reads FEC contribution lines one at a time, classifies each donor against
// the history seen so far, and writes a running percentile/sum/count row for
// every repeat-donor contribution. Single pass, single thread, input order.

use anyhow::{Context, Result};
use donation_analytics_codec::{parse_line, PipeWriter, RowSink};
use donation_analytics_config::{RuntimeConfig, ViolationPolicy};
use donation_analytics_core::{CoreError, Percentile, StreamingAggregator};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, warn};

mod init;
mod summary;

pub use init::init_tracing;
pub use summary::RunSummary;

/// Run the pipeline with a resolved configuration.
///
/// The percentile is resolved before the input is opened, so a bad percentile
/// aborts the run without producing any output.
pub fn run_with_config(config: &RuntimeConfig) -> Result<RunSummary> {
    let percentile = config
        .resolve_percentile()
        .context("Failed to resolve percentile")?;
    let policy = config.processing.on_invariant_violation;

    info!(
        input = %config.input.contributions,
        output = %config.output.path,
        %percentile,
        %policy,
        "Starting repeat-donor analysis"
    );

    let input_path = Path::new(&config.input.contributions);
    let input = File::open(input_path)
        .with_context(|| format!("Failed to open input file: {}", input_path.display()))?;
    let reader = BufReader::new(input);

    let summary = if config.output.is_stdout() {
        let stdout = io::stdout();
        let mut sink = PipeWriter::new(BufWriter::new(stdout.lock()));
        process_stream(reader, &mut sink, percentile, policy)?
    } else {
        let output_path = Path::new(&config.output.path);
        ensure_parent_dir(output_path)?;
        let output = File::create(output_path).with_context(|| {
            format!("Failed to create output file: {}", output_path.display())
        })?;
        let mut sink = PipeWriter::new(BufWriter::new(output));
        process_stream(reader, &mut sink, percentile, policy)?
    };

    summary.log();

    if let Some(summary_path) = &config.output.summary {
        summary.write_json(summary_path)?;
        info!(path = %summary_path, "Wrote run summary");
    }

    Ok(summary)
}

/// Stream every line of `reader` through the aggregator into `sink`.
///
/// Each row is handed to the sink before the next line is read. Lines that fail
/// field validation are counted and skipped; invariant violations follow `policy`.
pub fn process_stream<R, S>(
    mut reader: R,
    sink: &mut S,
    percentile: Percentile,
    policy: ViolationPolicy,
) -> Result<RunSummary>
where
    R: BufRead,
    S: RowSink,
{
    let mut aggregator = StreamingAggregator::new(percentile);
    let mut summary = RunSummary::new(percentile);
    let mut buf = Vec::with_capacity(512);
    let mut line_no: u64 = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read input line {}", line_no + 1))?;
        if read == 0 {
            break;
        }
        line_no += 1;
        summary.lines_read += 1;

        let text = decode_line(&buf);
        let line = text.trim_end_matches(&['\n', '\r'][..]);
        if line.trim().is_empty() {
            summary.blank_lines += 1;
            continue;
        }

        let record = match parse_line(line) {
            Ok(record) => record,
            Err(reason) => {
                summary.rejected.record(reason);
                debug!(line = line_no, reason = reason.as_str(), "Rejected input line");
                continue;
            }
        };
        summary.records_accepted += 1;

        match aggregator.process(&record) {
            Ok(Some(row)) => sink
                .emit(&row)
                .with_context(|| format!("Failed to write output row for line {}", line_no))?,
            Ok(None) => {}
            Err(err @ CoreError::InvariantViolation { .. }) if policy == ViolationPolicy::Skip => {
                warn!(line = line_no, error = %err, "Skipping record");
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("Failed to process input line {}", line_no)));
            }
        }
    }

    sink.flush().context("Failed to flush output")?;
    summary.absorb(
        aggregator.stats(),
        aggregator.distinct_donors(),
        aggregator.cohort_count(),
    );
    Ok(summary)
}

/// Decode one raw input line. Lines that are not valid UTF-8 are read as
/// Latin-1, the encoding older FEC bulk files use for accented names.
fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}
