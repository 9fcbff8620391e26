//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Pick level and format from configuration
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level when set
//! - JSON format for production, pretty format for development
//! - Initializing twice is reported, not fatal to callers that ignore it

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Logging could not be set up.
#[derive(Debug, thiserror::Error)]
#[error("failed to initialize logging: {0}")]
pub struct LoggingError(String);

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.to_ascii_lowercase()))
        .map_err(|e| LoggingError(e.to_string()))?;

    let result = match config.log_format {
        LogFormat::Pretty => fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .pretty()
            .try_init(),
        LogFormat::Json => fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(false)
            .try_init(),
    };

    result.map_err(|e| LoggingError(e.to_string()))
}
