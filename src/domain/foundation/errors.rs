//! Error types shared across the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors raised when an input fails validation, before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Unsupported {field}: '{value}' (expected one of: {expected})")]
    Unsupported {
        field: String,
        value: String,
        expected: String,
    },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an error for a value outside a closed set.
    pub fn unsupported(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &[&str],
    ) -> Self {
        ValidationError::Unsupported {
            field: field.into(),
            value: value.into(),
            expected: expected.join(", "),
        }
    }
}

/// Stable error codes presented to callers at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    DocumentNotFound,
    StorageError,
    RendererUnavailable,
    RenderTimeout,
    RenderFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::RendererUnavailable => "RENDERER_UNAVAILABLE",
            ErrorCode::RenderTimeout => "RENDER_TIMEOUT",
            ErrorCode::RenderFailed => "RENDER_FAILED",
        };
        write!(f, "{}", s)
    }
}
