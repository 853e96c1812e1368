//! Configuration errors
//!
//! Everything else in the simulation is infallible: missing handles are
//! no-ops and invariant breaks are debug assertions.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::SimConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric parameter is out of its allowed range
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    /// JSON parsing failed
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
