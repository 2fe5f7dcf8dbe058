//! Tracing subscriber setup for embedders.

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{DbError, Result};

/// Initializes the global tracing subscriber with the given filter directive
/// (e.g. `"grafito=debug"`). Fails if called twice or on a bad directive.
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| DbError::InvalidArgument(format!("invalid log filter: {e}")))?,
        )
        .with_target(true)
        .try_init()
        .map_err(|_| DbError::InvalidArgument("logging already initialized".into()))
}
