//! Error types for clusterfit operations.
//!
//! This module defines [`ClusterfitError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Provider transport and decode failures are scoped to the check that
//!   issued the call; they surface as Failed or Skipped results, not as
//!   process-level errors
//! - `ClusterfitError` is reserved for failures the run cannot recover
//!   from: invalid configuration, a broken output pipeline, adapter setup
//! - Use `anyhow::Error` (via `ClusterfitError::Other`) for unexpected errors

use thiserror::Error;

use crate::provider::ProviderError;

/// Core error type for clusterfit operations.
#[derive(Debug, Error)]
pub enum ClusterfitError {
    /// Invalid configuration values supplied by the caller.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A provider adapter could not be constructed or failed fatally.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// IO error wrapper; raised by result writers on output failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure in the output pipeline.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for clusterfit operations.
pub type Result<T> = std::result::Result<T, ClusterfitError>;
