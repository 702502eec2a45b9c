//! Error types for medic operations.
//!
//! This module defines [`MedicError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Per-item failures (one module, one requirement, one log line) are
//!   recorded in reports and never abort a batch
//! - `MedicError` is returned across seams where a caller must decide
//!   (config loading, registry and installer capabilities, log tailing)
//! - Use `anyhow::Error` (via `MedicError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for medic operations.
#[derive(Debug, Error)]
pub enum MedicError {
    /// A file or directory does not exist.
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// A file exists but cannot be read with the caller's permissions.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// A requirement spec, version, or log line could not be parsed.
    #[error("Malformed input '{input}': {message}")]
    MalformedInput { input: String, message: String },

    /// The package manager or registry tool failed or timed out.
    #[error("External tool failed ({command}): {message}")]
    ExternalToolFailure { command: String, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MedicError {
    /// Classify an I/O error against the path it was raised for.
    ///
    /// `NotFound` and `PermissionDenied` become their own variants so callers
    /// can report them distinctly; everything else stays an `Io` error.
    pub fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => MedicError::NotFound { path: path.into() },
            std::io::ErrorKind::PermissionDenied => {
                MedicError::PermissionDenied { path: path.into() }
            }
            _ => MedicError::Io(err),
        }
    }
}

/// Result type alias for medic operations.
pub type Result<T> = std::result::Result<T, MedicError>;
