//! Subscriber installation for shells that own the process.
//!
//! The core only emits `tracing` events. A shell that wants them on stderr
//! calls [`init`] once at startup; embedding shells with their own subscriber
//! skip it.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The fallback directive could not be parsed.
    #[error("Invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    /// Failed to set the global tracing subscriber.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

/// Install a fmt subscriber filtered by `RUST_LOG`, or by `default_directive`
/// when `RUST_LOG` is unset or invalid.
///
/// Subsequent calls are no-ops.
pub fn init(default_directive: &str) -> Result<(), LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|source| LoggingError::Filter {
            directive: default_directive.to_string(),
            source,
        })?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(env_filter)
        .try_init()?;
    Ok(())
}
