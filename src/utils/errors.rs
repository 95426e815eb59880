// src/utils/errors.rs
//! Engine error types
//!
//! All fallible engine operations return [`Result`]. The taxonomy is
//! deliberately small: capture-side failures are dropped at the producer
//! (they cannot propagate out of a notification context), so most variants
//! belong to the consumer and configuration surfaces.

use thiserror::Error;

/// Engine-wide result alias
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Event record construction failed (allocation)
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// A packed event buffer could not be decoded
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// Exporting decoded events failed
    #[error("export failed: {0}")]
    ExportFailed(String),

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    ConfigFailed(String),

    /// A notification source failed
    #[error("hook source failed: {0}")]
    SourceFailed(String),
}
