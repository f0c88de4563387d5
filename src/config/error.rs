//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ConfigValidationError),

    #[error("Failed to create root directory {path}: {source}")]
    RootDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid {field}: {value} seconds (must be between {min} and {max})")]
    InvalidTimeout {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}
