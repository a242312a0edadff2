//! Analysis error types

use thiserror::Error;

/// Errors that can occur during analysis operations
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Digest computation is broken; never recovered from
    #[error("Fingerprint self-test failed: {0}")]
    Fingerprint(String),

    /// Similarity threshold outside [0.0, 1.0]
    #[error("Invalid similarity threshold {0}: expected a value in [0.0, 1.0]")]
    InvalidThreshold(f64),

    /// Document store error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
