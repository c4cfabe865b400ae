//! Logging initialization using tracing.
//!
//! Both initializers honour `RUST_LOG` when it is set and fall back to the
//! given level otherwise.

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt,
    fmt::time::ChronoUtc,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

fn filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level: {}", level)),
    }
}

/// Initialize the tracing subscriber with human-readable output.
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error)
///
/// # Example
/// ```no_run
/// stratus_common::init_logging("info").unwrap();
/// ```
pub fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(level)?)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr)
        )
        .try_init()
        .context("Logging already initialized")?;

    Ok(())
}

/// Initialize logging with JSON output format.
/// Suitable for production environments with log aggregation.
pub fn init_logging_json(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(level)?)
        .with(
            fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
        )
        .try_init()
        .context("Logging already initialized")?;

    Ok(())
}
