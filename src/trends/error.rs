//! Trend engine error types.
//!
//! Degenerate data is not an error: it shows up as a `None` status or a
//! missing model. These variants cover caller contract violations only.

use thiserror::Error;

use crate::storage::config::ConfigError;

/// Errors raised at the engine boundary.
#[derive(Debug, Error)]
pub enum TrendError {
    /// Invalid input provided by the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Engine configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Result type for trend engine operations.
pub type TrendResult<T> = Result<T, TrendError>;
