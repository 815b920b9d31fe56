//! Errors at the file and configuration boundary
//!
//! The planning stages themselves never fail; they clamp and fall back.
//! Only loading recordings, validating settings, and writing plans can.

use thiserror::Error;

/// Errors that can occur while loading input or writing a plan
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid recording: {0}")]
    InvalidRecording(String),
}

/// Result type for processing operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;
