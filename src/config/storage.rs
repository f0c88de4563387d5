//! Document storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::{ConfigError, ConfigValidationError};

/// Legacy environment variable naming the root directory.
pub const LEGACY_ROOT_DIR_VAR: &str = "SIMPLE_HTML_ROOT_DIR";

/// Directory under the home directory used when nothing else is configured.
pub const DEFAULT_ROOT_DIR_NAME: &str = ".simple_html_docs";

/// Document storage configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one subdirectory per document
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Create a config with an explicit root directory
    pub fn with_root_dir(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: Some(root_dir.into()),
        }
    }

    /// Resolve the root directory.
    ///
    /// Order: `storage.root_dir`, then `SIMPLE_HTML_ROOT_DIR`, then
    /// `~/.simple_html_docs`.
    pub fn resolved_root_dir(&self) -> Result<PathBuf, ConfigValidationError> {
        if let Some(root) = self.root_dir.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            return Ok(root.clone());
        }

        if let Some(legacy) = std::env::var_os(LEGACY_ROOT_DIR_VAR).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(legacy));
        }

        dirs::home_dir()
            .map(|home| home.join(DEFAULT_ROOT_DIR_NAME))
            .ok_or(ConfigValidationError::MissingRequired("storage.root_dir"))
    }

    /// Resolve the root directory and create it (mode 0755) if missing.
    pub fn ensure_root_dir(&self) -> Result<PathBuf, ConfigError> {
        let root = self.resolved_root_dir()?;

        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }

        builder
            .create(&root)
            .map_err(|source| ConfigError::RootDirectory {
                path: root.clone(),
                source,
            })?;

        Ok(root)
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.resolved_root_dir().map(|_| ())
    }
}
