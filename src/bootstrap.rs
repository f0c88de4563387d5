//! Composition root: configuration in, wired services out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::export::{ChromePdfRenderer, PandocRenderer};
use crate::adapters::storage::LocalDocumentStore;
use crate::application::{DocumentService, ExportPipeline};
use crate::config::{AppConfig, ConfigError, ExportConfig};
use crate::ports::DocumentRenderer;
use crate::telemetry;

/// Fully wired document service and export pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let app = App::from_config(&AppConfig::load()?)?;
///
/// let doc = app.documents.create_document("My Report", "<h1>Hi</h1>").await?;
/// let pdf = app.exports.export(doc.id.as_str(), "pdf", None).await?;
/// ```
#[derive(Clone)]
pub struct App {
    root_dir: PathBuf,
    pub documents: DocumentService,
    pub exports: ExportPipeline,
}

impl App {
    /// Validates `config`, creates the root directory and wires everything.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let root_dir = config.storage.ensure_root_dir()?;

        let documents = DocumentService::new(Arc::new(LocalDocumentStore::new(&root_dir)));
        let renderers = build_renderers(&config.export);
        let renderer_names: Vec<_> = renderers.iter().map(|r| r.name().to_string()).collect();
        let exports = ExportPipeline::new(documents.clone(), renderers);

        tracing::info!(
            root_dir = %root_dir.display(),
            renderers = ?renderer_names,
            "Document store ready"
        );

        Ok(Self {
            root_dir,
            documents,
            exports,
        })
    }

    /// Loads configuration from the environment, installs logging, then
    /// [`App::from_config`].
    ///
    /// An already installed global subscriber is left in place.
    pub fn load() -> Result<Self, ConfigError> {
        let config = AppConfig::load()?;
        if let Err(e) = telemetry::init(&config.logging) {
            tracing::debug!(error = %e, "Keeping existing tracing subscriber");
        }
        Self::from_config(&config)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

/// Renderers in priority order: browser (when enabled), then converter.
pub fn build_renderers(config: &ExportConfig) -> Vec<Arc<dyn DocumentRenderer>> {
    let mut renderers: Vec<Arc<dyn DocumentRenderer>> = Vec::new();

    if config.browser_enabled {
        let mut browser = ChromePdfRenderer::new(config.browser_timeout());
        if let Some(path) = &config.browser_path {
            browser = browser.with_browser_path(path);
        }
        renderers.push(Arc::new(browser));
    }

    renderers.push(Arc::new(
        PandocRenderer::new(config.converter_timeout())
            .with_program(&config.converter_path)
            .with_pdf_engine(Some(config.pdf_engine.clone())),
    ));

    renderers
}
