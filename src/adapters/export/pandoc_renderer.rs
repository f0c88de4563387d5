//! Pandoc-based document converter.
//!
//! Converts the stored HTML (without print-style injection) to PDF or DOCX by
//! running `pandoc` in the document directory, so relative media references
//! resolve. PDF output goes through a LaTeX engine (`xelatex` by default, for
//! Unicode coverage).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::bounded_command::BoundedCommand;
use super::temp_html::write_temp_html;
use crate::ports::{DocumentRenderer, ExportFormat, RenderError, RenderRequest};

/// Default LaTeX engine for PDF output.
pub const DEFAULT_PDF_ENGINE: &str = "xelatex";

/// Renderer that shells out to Pandoc.
///
/// # Example
///
/// ```rust,ignore
/// let renderer = PandocRenderer::new(Duration::from_secs(30))
///     .with_program("/usr/local/bin/pandoc");
///
/// if renderer.is_available().await {
///     renderer.render(&request).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PandocRenderer {
    /// Executable name or path. Bare names are resolved on PATH.
    program: PathBuf,
    /// Engine passed as `--pdf-engine` for PDF output.
    pdf_engine: Option<String>,
    timeout: Duration,
}

impl PandocRenderer {
    pub const NAME: &'static str = "pandoc";

    /// Create a renderer using `pandoc` from PATH and the default PDF engine.
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: PathBuf::from("pandoc"),
            pdf_engine: Some(DEFAULT_PDF_ENGINE.to_string()),
            timeout,
        }
    }

    /// Set a custom path to the Pandoc executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the PDF engine; `None` lets Pandoc pick its own default.
    pub fn with_pdf_engine(mut self, engine: Option<String>) -> Self {
        self.pdf_engine = engine;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full argument list for one conversion.
    fn arguments(&self, format: ExportFormat, input: &str, output: &str) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            "html".to_string(),
            "-o".to_string(),
            output.to_string(),
        ];
        if format == ExportFormat::Pdf {
            if let Some(engine) = &self.pdf_engine {
                args.push(format!("--pdf-engine={}", engine));
            }
        }
        args.push(input.to_string());
        args
    }
}

#[async_trait]
impl DocumentRenderer for PandocRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports(&self, format: ExportFormat) -> bool {
        matches!(format, ExportFormat::Pdf | ExportFormat::Docx)
    }

    async fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        if !self.is_available().await {
            return Err(RenderError::unavailable(
                Self::NAME,
                format!(
                    "{} not found; install pandoc to enable PDF/DOCX export",
                    self.program.display()
                ),
            ));
        }

        let temp = write_temp_html(
            request.document_dir,
            &request.document.html_content,
            Self::NAME,
        )
        .await?;

        // Pandoc runs inside the document directory, so the input is named relative to it
        let input = temp
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| RenderError::io(Self::NAME, "temp file has no name"))?;
        let output = request.output_path.to_string_lossy().to_string();

        let result = BoundedCommand::new(self.program.as_os_str(), self.timeout)
            .args(self.arguments(request.format, &input, &output))
            .current_dir(request.document_dir)
            .run()
            .await
            .map_err(|e| e.into_render_error(Self::NAME))?;

        drop(temp);

        if !result.success() {
            let stderr = result.stderr.trim();
            let message = if stderr.is_empty() {
                format!("exited with {}", result.status)
            } else {
                format!("exited with {}: {}", result.status, stderr)
            };
            return Err(RenderError::failed(Self::NAME, message));
        }

        Ok(())
    }

    async fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
