//! Export renderer configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ConfigValidationError;

/// Bounds accepted for renderer timeouts, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Export renderer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Try the headless browser before the converter for PDF
    #[serde(default = "default_browser_enabled")]
    pub browser_enabled: bool,

    /// Browser executable; system install or managed download when unset
    #[serde(default)]
    pub browser_path: Option<PathBuf>,

    /// Browser attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub browser_timeout_secs: u64,

    /// Converter executable name or path
    #[serde(default = "default_converter_path")]
    pub converter_path: String,

    /// Converter process timeout in seconds
    #[serde(default = "default_timeout")]
    pub converter_timeout_secs: u64,

    /// LaTeX engine the converter uses for PDF
    #[serde(default = "default_pdf_engine")]
    pub pdf_engine: String,
}

impl ExportConfig {
    /// Get browser timeout as Duration
    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_secs)
    }

    /// Get converter timeout as Duration
    pub fn converter_timeout(&self) -> Duration {
        Duration::from_secs(self.converter_timeout_secs)
    }

    /// Validate export configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        check_timeout("export.browser_timeout_secs", self.browser_timeout_secs)?;
        check_timeout("export.converter_timeout_secs", self.converter_timeout_secs)?;

        if self.converter_path.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("export.converter_path"));
        }
        if self.pdf_engine.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("export.pdf_engine"));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            browser_enabled: default_browser_enabled(),
            browser_path: None,
            browser_timeout_secs: default_timeout(),
            converter_path: default_converter_path(),
            converter_timeout_secs: default_timeout(),
            pdf_engine: default_pdf_engine(),
        }
    }
}

fn check_timeout(field: &'static str, value: u64) -> Result<(), ConfigValidationError> {
    if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&value) {
        return Err(ConfigValidationError::InvalidTimeout {
            field,
            value,
            min: MIN_TIMEOUT_SECS,
            max: MAX_TIMEOUT_SECS,
        });
    }
    Ok(())
}

fn default_browser_enabled() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_converter_path() -> String {
    "pandoc".to_string()
}

fn default_pdf_engine() -> String {
    "xelatex".to_string()
}
