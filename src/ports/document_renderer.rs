//! Document Renderer Port - Format conversion interface.
//!
//! This port defines the contract for turning a stored HTML document into an
//! output artifact. The export pipeline holds an ordered list of renderers and
//! tries them in turn; adapters (headless browser, pandoc) provide the
//! implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::domain::document::Document;
use crate::domain::foundation::{ErrorCode, ValidationError};

/// Port for rendering a document to an output file.
///
/// # Contract
///
/// Implementations must:
/// - Write the artifact to `request.output_path` and nothing else outside
///   the document directory
/// - Remove any temporary files they create before returning
/// - Bound every external process by a timeout
/// - Report `RenderError::Unavailable` when their backend cannot be started,
///   so the pipeline can move on to the next renderer
///
/// # Usage
///
/// ```rust,ignore
/// let renderer: &dyn DocumentRenderer = get_renderer();
///
/// if renderer.supports(ExportFormat::Pdf) {
///     renderer.render(&request).await?;
/// }
/// ```
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Whether this renderer can produce `format`.
    fn supports(&self, format: ExportFormat) -> bool;

    /// Renders the document described by `request`.
    async fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError>;

    /// Check if the renderer's backend can be started on this host.
    async fn is_available(&self) -> bool;
}

/// Everything a renderer needs for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub document: &'a Document,
    /// Directory the document lives in; temp files and working dir go here.
    pub document_dir: &'a Path,
    pub output_path: &'a Path,
    pub format: ExportFormat,
}

/// Export formats supported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// The stored HTML, copied verbatim.
    Html,
    /// PDF document.
    Pdf,
    /// Word document.
    Docx,
}

impl ExportFormat {
    /// All accepted format names.
    pub const NAMES: [&'static str; 3] = ["html", "pdf", "docx"];

    /// Get the MIME content type for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            _ => Err(ValidationError::unsupported("format", s, &Self::NAMES)),
        }
    }
}

/// Errors that can occur during a render attempt.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// Backend binary or process could not be started.
    #[error("{renderer} unavailable: {reason}")]
    Unavailable { renderer: String, reason: String },

    /// Backend did not finish in time and was killed.
    #[error("{renderer} timed out after {timeout_secs} seconds")]
    Timeout { renderer: String, timeout_secs: u64 },

    /// Backend ran but did not produce the artifact.
    #[error("{renderer} failed: {message}")]
    Failed { renderer: String, message: String },

    /// I/O error while preparing input or writing output.
    #[error("I/O error during {renderer} render: {message}")]
    Io { renderer: String, message: String },
}

impl RenderError {
    /// Create an unavailable error.
    pub fn unavailable(renderer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            renderer: renderer.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(renderer: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            renderer: renderer.into(),
            timeout_secs,
        }
    }

    /// Create a render failure.
    pub fn failed(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            renderer: renderer.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            renderer: renderer.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unavailable { .. } => ErrorCode::RendererUnavailable,
            Self::Timeout { .. } => ErrorCode::RenderTimeout,
            Self::Failed { .. } => ErrorCode::RenderFailed,
            Self::Io { .. } => ErrorCode::StorageError,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    // ───────────────────────────────────────────────────────────────
    // ExportFormat tests
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn export_format_extensions_are_correct() {
        assert_eq!(ExportFormat::Html.extension(), "html");
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
        assert_eq!(ExportFormat::Docx.extension(), "docx");
    }

    #[test]
    fn export_format_content_types_are_correct() {
        assert_eq!(ExportFormat::Html.content_type(), "text/html; charset=utf-8");
        assert_eq!(ExportFormat::Pdf.content_type(), "application/pdf");
        assert!(ExportFormat::Docx.content_type().contains("wordprocessingml"));
    }

    #[test]
    fn export_format_parses_from_string() {
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("docx".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
    }

    #[test]
    fn export_format_parse_rejects_unknown_format() {
        for value in ["odt", "", "PDF", "Html", " pdf"] {
            let result = value.parse::<ExportFormat>();
            assert!(
                matches!(result, Err(ValidationError::Unsupported { .. })),
                "should reject {:?}",
                value
            );
        }
    }

    #[test]
    fn export_format_serializes_to_snake_case() {
        assert_eq!(serde_json::to_string(&ExportFormat::Docx).unwrap(), "\"docx\"");
    }

    // ───────────────────────────────────────────────────────────────
    // RenderError tests
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn render_error_displays_messages() {
        let err = RenderError::unavailable("pandoc", "not found on PATH");
        assert_eq!(err.to_string(), "pandoc unavailable: not found on PATH");

        let err = RenderError::timeout("chrome", 30);
        assert_eq!(err.to_string(), "chrome timed out after 30 seconds");

        let err = RenderError::failed("pandoc", "exit status 43: xelatex not found");
        assert!(err.to_string().contains("xelatex not found"));
    }

    #[test]
    fn render_error_codes_match_taxonomy() {
        assert_eq!(RenderError::unavailable("x", "y").code(), ErrorCode::RendererUnavailable);
        assert_eq!(RenderError::timeout("x", 1).code(), ErrorCode::RenderTimeout);
        assert_eq!(RenderError::failed("x", "y").code(), ErrorCode::RenderFailed);
    }

    // ───────────────────────────────────────────────────────────────
    // Trait object safety test
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn document_renderer_is_object_safe() {
        fn check<T: DocumentRenderer + ?Sized>() {}
        check::<dyn DocumentRenderer>();
    }
}
