//! Error types for sweep operations

use thiserror::Error;

/// Errors that can occur during relationship sweeps
#[derive(Error, Debug)]
pub enum SweepError {
    /// Malformed request (e.g. partition outside the fixed range); no work was done
    #[error("Invalid input: {0}")]
    Input(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
