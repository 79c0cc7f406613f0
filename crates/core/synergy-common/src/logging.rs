//! Tracing initialisation shared by the Synergy binaries
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Error;
use crate::result::Result;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level` when it is set.
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| Error::configuration(format!("Invalid log level '{}': {}", log_level, e)))?;

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}
