//! Error types and handling for `ci_flakes`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Wraps `anyhow` for ad-hoc failures in glue code
//! - Provides recovery hints for user-facing errors
//! - Maps every error to a stable code and exit status (see [`StructuredError`])
//!
//! Per-field and per-record parse failures are never errors: the line parser
//! and timestamp resolution turn them into `None`.

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `ci_flakes` operations.
#[derive(Error, Debug)]
pub enum CiFlakesError {
    // === Network Errors ===
    /// The request could not be sent or the body could not be read.
    #[error("Network error fetching '{url}': {message}")]
    Network { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from '{url}'")]
    Http { status: u16, url: String },

    // === Configuration Errors ===
    /// Configuration value or file is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration or argument value failed validation.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    // === I/O Errors ===
    /// Reading an input page failed.
    #[error("Cannot read input '{path}': {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an export file failed.
    #[error("Cannot write '{path}': {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Failure in glue code with no user-facing remedy (e.g. TLS setup).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CiFlakesError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Network { .. } => Some("Check connectivity or pass --timeout / --input"),
            Self::Http { .. } => Some("Check --url and the filter query parameters"),
            Self::Validation { .. } => {
                Some("Windows look like 48h, 2d, 90m or 1w; --top must be positive")
            }
            Self::Input { .. } => Some("Pass an existing file to --input, or '-' for stdin"),
            Self::Export { .. } => Some("Check that --output-dir exists and is writable"),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `CiFlakesError`.
pub type Result<T> = std::result::Result<T, CiFlakesError>;
