// Logging/tracing setup
//
// Logs go to stderr so that stdout can carry output rows when output.path is "-".

use donation_analytics_config::{LogFormat, RuntimeConfig};

/// Initialize the global tracing subscriber from `[log]`.
///
/// `RUST_LOG` takes precedence over `log.level` when set. Calling this twice is
/// harmless; the second subscriber is ignored.
pub fn init_tracing(config: &RuntimeConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.log.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already initialized");
    }
}
