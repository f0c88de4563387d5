//! ExportPipeline - Produces output artifacts from stored documents.
//!
//! HTML export is a verbatim copy of the stored body. PDF and DOCX go through
//! an ordered list of renderers: each one that supports the format is tried in
//! turn until one succeeds. Every failed attempt is kept so the final error
//! explains the whole chain, not just the last link.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::document_service::{DocumentError, DocumentService};
use crate::domain::document::Document;
use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::ports::{DocumentRenderer, ExportFormat, RenderError, RenderRequest};

/// One failed renderer attempt.
#[derive(Debug, Clone)]
pub struct RenderAttempt {
    pub renderer: String,
    pub error: RenderError,
}

impl fmt::Display for RenderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error.code(), self.error)
    }
}

/// Errors surfaced by export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Failed to write export to {path}: {message}")]
    Io { path: String, message: String },

    #[error("No renderer supports {format} export")]
    NoRenderer { format: ExportFormat },

    #[error("{format} export of {document_id} failed: {}", join_attempts(.attempts))]
    AllRenderersFailed {
        document_id: String,
        format: ExportFormat,
        attempts: Vec<RenderAttempt>,
    },
}

impl ExportError {
    fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// The failure from the last renderer tried, if any renderer ran.
    pub fn last_render_error(&self) -> Option<&RenderError> {
        match self {
            Self::AllRenderersFailed { attempts, .. } => attempts.last().map(|a| &a.error),
            _ => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Document(err) => err.code(),
            Self::Io { .. } => ErrorCode::StorageError,
            Self::NoRenderer { .. } => ErrorCode::RendererUnavailable,
            Self::AllRenderersFailed { .. } => self
                .last_render_error()
                .map(RenderError::code)
                .unwrap_or(ErrorCode::RenderFailed),
        }
    }
}

fn join_attempts(attempts: &[RenderAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Diagnostic view of one configured renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RendererStatus {
    pub name: String,
    pub formats: Vec<ExportFormat>,
    pub available: bool,
}

/// Export pipeline.
///
/// # Usage
///
/// ```rust,ignore
/// let pipeline = ExportPipeline::new(
///     service,
///     vec![Arc::new(ChromePdfRenderer::new(timeout)), Arc::new(PandocRenderer::new(timeout))],
/// );
///
/// let pdf = pipeline.export("my-report-a3f9", "pdf", None).await?;
/// ```
#[derive(Clone)]
pub struct ExportPipeline {
    documents: DocumentService,
    renderers: Vec<Arc<dyn DocumentRenderer>>,
}

impl ExportPipeline {
    /// Renderers are tried in the given order.
    pub fn new(documents: DocumentService, renderers: Vec<Arc<dyn DocumentRenderer>>) -> Self {
        Self {
            documents,
            renderers,
        }
    }

    pub fn renderers(&self) -> &[Arc<dyn DocumentRenderer>] {
        &self.renderers
    }

    /// Exports a document, parsing `format` first.
    ///
    /// Without `output_path` the artifact goes to `<doc_dir>/<id>.<ext>`.
    /// Returns the path written.
    pub async fn export(
        &self,
        document_id: &str,
        format: &str,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, ExportError> {
        let format: ExportFormat = format.parse()?;
        self.export_as(document_id, format, output_path).await
    }

    /// Exports a document to an already-parsed format.
    pub async fn export_as(
        &self,
        document_id: &str,
        format: ExportFormat,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, ExportError> {
        let document = self.documents.get_document(document_id).await?;
        let document_dir = self.documents.document_path(&document.id);

        let output = match output_path {
            Some(path) => {
                let path = absolutize(path)?;
                if let Some(parent) = path.parent() {
                    ensure_dir(parent).await?;
                }
                path
            }
            None => absolutize(
                &document_dir.join(format!("{}.{}", document.id, format.extension())),
            )?,
        };

        match format {
            ExportFormat::Html => {
                tokio::fs::write(&output, document.html_content.as_bytes())
                    .await
                    .map_err(|e| ExportError::io(&output, e))?;
            }
            ExportFormat::Pdf | ExportFormat::Docx => {
                self.render_with_fallback(&document, &document_dir, &output, format)
                    .await?;
            }
        }

        tracing::info!(
            document_id = %document.id,
            format = %format,
            output = %output.display(),
            "Document exported"
        );
        Ok(output)
    }

    async fn render_with_fallback(
        &self,
        document: &Document,
        document_dir: &Path,
        output: &Path,
        format: ExportFormat,
    ) -> Result<(), ExportError> {
        let request = RenderRequest {
            document,
            document_dir,
            output_path: output,
            format,
        };

        let mut attempts = Vec::new();

        for renderer in self.renderers.iter().filter(|r| r.supports(format)) {
            match renderer.render(&request).await {
                Ok(()) => {
                    if !attempts.is_empty() {
                        tracing::info!(
                            document_id = %document.id,
                            renderer = renderer.name(),
                            failed_attempts = attempts.len(),
                            "Fallback renderer succeeded"
                        );
                    }
                    return Ok(());
                }
                Err(error) => {
                    tracing::warn!(
                        document_id = %document.id,
                        renderer = renderer.name(),
                        code = %error.code(),
                        error = %error,
                        "Renderer failed"
                    );
                    attempts.push(RenderAttempt {
                        renderer: renderer.name().to_string(),
                        error,
                    });
                }
            }
        }

        if attempts.is_empty() {
            return Err(ExportError::NoRenderer { format });
        }

        Err(ExportError::AllRenderersFailed {
            document_id: document.id.to_string(),
            format,
            attempts,
        })
    }

    /// Reports which configured renderers can run on this host.
    pub async fn available_renderers(&self) -> Vec<RendererStatus> {
        let mut statuses = Vec::with_capacity(self.renderers.len());
        for renderer in &self.renderers {
            let formats = [ExportFormat::Pdf, ExportFormat::Docx, ExportFormat::Html]
                .into_iter()
                .filter(|f| renderer.supports(*f))
                .collect();
            statuses.push(RendererStatus {
                name: renderer.name().to_string(),
                formats,
                available: renderer.is_available().await,
            });
        }
        statuses
    }
}

/// Renderers run in the document directory, so relative paths are resolved up front.
fn absolutize(path: &Path) -> Result<PathBuf, ExportError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| ExportError::io(path, e))
}

async fn ensure_dir(path: &Path) -> Result<(), ExportError> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);

    builder
        .create(path)
        .await
        .map_err(|e| ExportError::io(path, e))
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
