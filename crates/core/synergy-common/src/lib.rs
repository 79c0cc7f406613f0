//! Common utilities and types for Synergy

pub mod config;
pub mod error;
pub mod logging;
pub mod result;

pub use config::Configuration;
pub use error::Error;
pub use result::Result;
