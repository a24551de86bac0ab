//! Error types and error code constants for vylint.
//!
//! `VylintError` is the unified error type for CLI output. Domain errors
//! from other layers (patch application, configuration, rule evaluation)
//! bridge into it through `From` impls.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (file not found)
//! - `4`: Apply errors (failed to apply or write fixes)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::patch::PatchError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed config).
    InvalidArguments = 2,
    /// Resolution errors (file not found).
    ResolutionError = 3,
    /// Apply errors (failed to apply or write fixes).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum VylintError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to apply changes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl VylintError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        VylintError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        VylintError::FileNotFound { path: path.into() }
    }

    /// Create an apply error.
    pub fn apply(message: impl Into<String>, file: Option<String>) -> Self {
        VylintError::ApplyError {
            message: message.into(),
            file,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        VylintError::InternalError {
            message: message.into(),
        }
    }
}

impl From<&VylintError> for OutputErrorCode {
    fn from(err: &VylintError) -> Self {
        match err {
            VylintError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            VylintError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            VylintError::ApplyError { .. } => OutputErrorCode::ApplyError,
            VylintError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<PatchError> for VylintError {
    fn from(err: PatchError) -> Self {
        VylintError::apply(err.to_string(), None)
    }
}

impl From<ConfigError> for VylintError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => VylintError::file_not_found(path),
            other => VylintError::invalid_args(other.to_string()),
        }
    }
}
