//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SIMPLE_HTML` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment yields a working setup.
//!
//! # Example
//!
//! ```no_run
//! use html_docgen::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Documents live in {:?}", config.storage.resolved_root_dir());
//! ```

mod error;
mod export;
mod logging;
mod storage;

pub use error::{ConfigError, ConfigValidationError};
pub use export::{ExportConfig, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
pub use logging::{LogFormat, LoggingConfig};
pub use storage::{StorageConfig, DEFAULT_ROOT_DIR_NAME, LEGACY_ROOT_DIR_VAR};

use serde::Deserialize;

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Where documents are stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Renderer selection, executables and timeouts
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SIMPLE_HTML` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SIMPLE_HTML__STORAGE__ROOT_DIR=/srv/docs` -> `storage.root_dir = /srv/docs`
    /// - `SIMPLE_HTML__EXPORT__CONVERTER_TIMEOUT_SECS=60` -> `export.converter_timeout_secs = 60`
    ///
    /// The legacy `SIMPLE_HTML_ROOT_DIR` variable is honoured when
    /// `storage.root_dir` is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SIMPLE_HTML")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.storage.validate()?;
        self.export.validate()?;
        Ok(())
    }
}
