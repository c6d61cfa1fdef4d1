//! Structured error output.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::CiFlakesError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Network Errors (exit code 2) ===
    /// Transport failure
    NetworkError,
    /// Non-success HTTP status
    HttpStatus,

    // === Config Errors (exit code 3) ===
    /// Configuration error
    ConfigError,
    /// Value validation failed
    ValidationFailed,

    // === I/O Errors (exit code 4) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::HttpStatus => "HTTP_STATUS",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Nothing retries automatically; this only tells the caller that a
    /// second run might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::HttpStatus)
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Network errors
    /// - 3: Config errors
    /// - 4: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NetworkError | Self::HttpStatus => 2,
            Self::ConfigError | Self::ValidationFailed => 3,
            Self::IoError | Self::JsonError | Self::YamlError => 4,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `CiFlakesError`.
    #[must_use]
    pub fn from_error(err: &CiFlakesError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);

        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &CiFlakesError) -> (ErrorCode, Option<Value>) {
        match err {
            CiFlakesError::Network { url, .. } => {
                (ErrorCode::NetworkError, Some(json!({"url": url})))
            }
            CiFlakesError::Http { status, url } => (
                ErrorCode::HttpStatus,
                Some(json!({"status": status, "url": url})),
            ),
            CiFlakesError::Config(_) => (ErrorCode::ConfigError, None),
            CiFlakesError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            CiFlakesError::Input { path, .. } | CiFlakesError::Export { path, .. } => (
                ErrorCode::IoError,
                Some(json!({"path": path.display().to_string()})),
            ),
            CiFlakesError::Io(_) => (ErrorCode::IoError, None),
            CiFlakesError::Json(_) => (ErrorCode::JsonError, None),
            CiFlakesError::Yaml(_) => (ErrorCode::YamlError, None),
            CiFlakesError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}
