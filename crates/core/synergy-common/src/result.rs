//! Result type for Synergy

use crate::error::Error;

/// Result type for Synergy
pub type Result<T> = std::result::Result<T, Error>;
