//! Tracing subscriber setup from logging configuration

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use eo_shared::config::{LogFormat, LoggingConfig};

/// Pick the filter directive
///
/// `-v` flags win over `RUST_LOG`, which wins over the configured level.
pub fn filter_directive(logging: &LoggingConfig, verbosity: u8) -> String {
    match verbosity {
        0 => std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| logging.level.clone()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber; logs go to stderr
pub fn init(logging: &LoggingConfig, verbosity: u8) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter_directive(logging, verbosity))
        .context("invalid log filter")?;
    let source = logging.source_location;

    let registry = Registry::default().with(env_filter);

    match logging.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_file(source)
                    .with_line_number(source),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_file(source)
                    .with_line_number(source),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
    }
    .context("failed to install tracing subscriber")
}
