//! Diagnostic logging on stderr.
//!
//! Results go to stdout; everything `tracing` emits goes to stderr so piping
//! `pulsim config --no-write` into another tool stays clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// Install the global subscriber.
///
/// The level comes from `level` unless `RUST_LOG` is set.
pub fn init_logging(level: &str) -> Result<(), AppError> {
    let default_filter = format!("pulsim={level}");
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&default_filter)
            .map_err(|e| AppError::invalid(format!("Invalid log level '{level}': {e}")))?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .try_init()
        .map_err(|e| AppError::new(4, format!("Failed to initialise logging: {e}")))?;

    tracing::debug!(filter = %default_filter, "logging initialized");
    Ok(())
}
