use anyhow::{Context, Result};
use clap::Parser;
use donation_analytics_config::{LogFormat, RuntimeConfig};
use std::path::PathBuf;

/// Repeat-donor analytics over FEC individual contribution files
#[derive(Parser)]
#[command(name = "donation-analytics")]
#[command(version)]
#[command(
    about = "Streams FEC contributions and reports running percentile, total and count for repeat donors",
    long_about = None
)]
struct Cli {
    /// Contributions file (positional form: itcont.txt)
    #[arg(value_name = "ITCONT")]
    itcont: Option<PathBuf>,

    /// Percentile file (positional form: percentile.txt)
    #[arg(value_name = "PERCENTILE_FILE")]
    percentile_path: Option<PathBuf>,

    /// Output file (positional form: repeat_donors.txt)
    #[arg(value_name = "OUTPUT")]
    output_path: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Contributions file (overrides config file)
    #[arg(short, long, value_name = "FILE", conflicts_with = "itcont")]
    input: Option<PathBuf>,

    /// File holding the percentile value
    #[arg(long, value_name = "FILE", conflicts_with = "percentile_path")]
    percentile_file: Option<PathBuf>,

    /// Percentile in (0, 100]; wins over any percentile file
    #[arg(short, long, value_name = "P")]
    percentile: Option<f64>,

    /// Output file for repeat-donor rows, "-" for stdout
    #[arg(short, long, value_name = "FILE", conflicts_with = "output_path")]
    output: Option<PathBuf>,

    /// Write a JSON run summary to this file
    #[arg(short, long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log format: text, json
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration (file + environment)
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::load().context("Failed to load configuration")?,
    };

    // Step 2: Apply CLI overrides (highest priority)
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    // Step 3: Logging, then the single streaming pass
    donation_analytics::init_tracing(&config);
    donation_analytics::run_with_config(&config)?;
    Ok(())
}

fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) {
    if let Some(input) = cli.input.as_ref().or(cli.itcont.as_ref()) {
        config.input.contributions = input.display().to_string();
    }

    if let Some(path) = cli.percentile_file.as_ref().or(cli.percentile_path.as_ref()) {
        config.input.percentile_file = path.display().to_string();
        // An explicit file on the command line beats an inline value from config.
        config.input.percentile = None;
    }

    if let Some(value) = cli.percentile {
        config.input.percentile = Some(value);
    }

    if let Some(output) = cli.output.as_ref().or(cli.output_path.as_ref()) {
        config.output.path = output.display().to_string();
    }

    if let Some(summary) = &cli.summary {
        config.output.summary = Some(summary.display().to_string());
    }

    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
}
