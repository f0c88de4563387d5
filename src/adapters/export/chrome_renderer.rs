//! Headless browser PDF renderer.
//!
//! Prints the document through a headless Chromium session driven over the
//! DevTools protocol. This gives the closest match to how the HTML looks in a
//! browser, so it is the preferred PDF tier.
//!
//! The CDP client is blocking; the session runs on the blocking pool and the
//! async side races it against the configured timeout. The browser's idle
//! timeout is set to the same value so an abandoned session shuts itself down.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use url::Url;

use super::print_styles::inject_print_styles;
use super::temp_html::write_temp_html;
use crate::ports::{DocumentRenderer, ExportFormat, RenderError, RenderRequest};

/// Page margin in inches on every side.
const PAGE_MARGIN_INCHES: f64 = 0.4;

/// PDF renderer backed by headless Chromium.
///
/// # Browser resolution
///
/// 1. The configured `browser_path`, when set
/// 2. A system-installed Chrome/Chromium
/// 3. A managed download of Chromium
///
/// # Example
///
/// ```rust,ignore
/// let renderer = ChromePdfRenderer::new(Duration::from_secs(30))
///     .with_browser_path("/usr/bin/chromium");
/// ```
#[derive(Debug, Clone)]
pub struct ChromePdfRenderer {
    browser_path: Option<PathBuf>,
    timeout: Duration,
}

impl ChromePdfRenderer {
    pub const NAME: &'static str = "chrome";

    /// Create a renderer that bounds each attempt by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            browser_path: None,
            timeout,
        }
    }

    /// Use a specific browser executable.
    pub fn with_browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.browser_path = Some(path.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn launch_options(&self) -> Result<LaunchOptions<'static>, RenderError> {
        LaunchOptions::default_builder()
            .path(self.browser_path.clone())
            .headless(true)
            .idle_browser_timeout(self.timeout)
            .build()
            .map_err(|e| RenderError::unavailable(Self::NAME, e.to_string()))
    }
}

#[async_trait]
impl DocumentRenderer for ChromePdfRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports(&self, format: ExportFormat) -> bool {
        format == ExportFormat::Pdf
    }

    async fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        let html = inject_print_styles(&request.document.html_content);
        let temp = write_temp_html(request.document_dir, &html, Self::NAME).await?;

        let input = tokio::fs::canonicalize(temp.path()).await.map_err(|e| {
            RenderError::io(Self::NAME, format!("failed to resolve temp file: {}", e))
        })?;
        let url = file_url(&input)?;
        let options = self.launch_options()?;
        let timeout = self.timeout;

        tracing::debug!(document_id = %request.document.id, url = %url, "Launching headless browser");

        let session = tokio::task::spawn_blocking(move || print_page(options, &url, timeout));

        let pdf = match tokio::time::timeout(self.timeout, session).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                return Err(RenderError::failed(
                    Self::NAME,
                    format!("browser session panicked: {}", join_error),
                ))
            }
            Err(_) => return Err(RenderError::timeout(Self::NAME, self.timeout.as_secs())),
        };

        tokio::fs::write(request.output_path, &pdf).await.map_err(|e| {
            RenderError::io(
                Self::NAME,
                format!("failed to write {}: {}", request.output_path.display(), e),
            )
        })?;

        drop(temp);
        Ok(())
    }

    async fn is_available(&self) -> bool {
        match &self.browser_path {
            Some(path) => tokio::fs::metadata(path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            None => headless_chrome::browser::default_executable().is_ok(),
        }
    }
}

/// Runs one blocking browser session and returns the PDF bytes.
fn print_page(
    options: LaunchOptions<'static>,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, RenderError> {
    let browser = Browser::new(options)
        .map_err(|e| RenderError::unavailable(ChromePdfRenderer::NAME, e.to_string()))?;
    let tab = browser.new_tab().map_err(|e| stage_failed("open tab", e))?;
    tab.set_default_timeout(timeout);

    tab.navigate_to(url)
        .map_err(|e| stage_failed("navigate", e))?
        .wait_until_navigated()
        .map_err(|e| stage_failed("load page", e))?;

    tab.print_to_pdf(Some(PrintToPdfOptions {
        print_background: Some(true),
        margin_top: Some(PAGE_MARGIN_INCHES),
        margin_bottom: Some(PAGE_MARGIN_INCHES),
        margin_left: Some(PAGE_MARGIN_INCHES),
        margin_right: Some(PAGE_MARGIN_INCHES),
        prefer_css_page_size: Some(true),
        ..Default::default()
    }))
    .map_err(|e| stage_failed("print to PDF", e))
}

fn stage_failed(stage: &str, err: impl std::fmt::Display) -> RenderError {
    RenderError::failed(ChromePdfRenderer::NAME, format!("{}: {}", stage, err))
}

/// Percent-encoded `file://` URL for an absolute path.
fn file_url(path: &Path) -> Result<String, RenderError> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|_| {
            RenderError::io(
                ChromePdfRenderer::NAME,
                format!("cannot build file URL for {}", path.display()),
            )
        })
}
