//! Integration tests for PDF/DOCX export through the wired application.
//!
//! A shell script stands in for pandoc so no real converter or browser is
//! needed. The script copies its input (last argument) to the `-o` target
//! and records its arguments next to it.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use html_docgen::application::ExportError;
use html_docgen::bootstrap::App;
use html_docgen::config::{AppConfig, ExportConfig, StorageConfig};
use html_docgen::domain::foundation::ErrorCode;
use html_docgen::ports::RenderError;

// =============================================================================
// Test Infrastructure
// =============================================================================

const COPYING_CONVERTER: &str = r#"#!/bin/sh
out=""
prev=""
for arg; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
  last="$arg"
done
echo "$@" > "$out.args"
cp "$last" "$out"
"#;

struct TestEnv {
    root: TempDir,
    tools: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            tools: TempDir::new().unwrap(),
        }
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.tools.path().join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn app(&self, export: ExportConfig) -> App {
        App::from_config(&AppConfig {
            storage: StorageConfig::with_root_dir(self.root.path()),
            export,
            ..Default::default()
        })
        .unwrap()
    }

    fn converter_only(&self, converter: &Path, timeout_secs: u64) -> App {
        self.app(ExportConfig {
            browser_enabled: false,
            converter_path: converter.to_string_lossy().to_string(),
            converter_timeout_secs: timeout_secs,
            ..Default::default()
        })
    }
}

fn temp_exports(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("temp_export"))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn pdf_export_through_converter() {
    let env = TestEnv::new();
    let converter = env.script("fake-pandoc", COPYING_CONVERTER);
    let app = env.converter_only(&converter, 10);
    let doc = app.documents.create_document("Report", "<h1>Report</h1>").await.unwrap();

    let output = app.exports.export(doc.id.as_str(), "pdf", None).await.unwrap();

    let doc_dir = app.documents.document_path(&doc.id);
    assert_eq!(output, doc_dir.join(format!("{}.pdf", doc.id)));
    // unmodified HTML reaches the converter
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "<h1>Report</h1>");
    let args = std::fs::read_to_string(format!("{}.args", output.display())).unwrap();
    assert!(args.starts_with("-f html -o "));
    assert!(args.contains("--pdf-engine=xelatex"));
    assert!(temp_exports(&doc_dir).is_empty());
}

#[tokio::test]
async fn docx_export_omits_pdf_engine() {
    let env = TestEnv::new();
    let converter = env.script("fake-pandoc", COPYING_CONVERTER);
    let app = env.converter_only(&converter, 10);
    let doc = app.documents.create_document("Memo", "<p>memo</p>").await.unwrap();
    let out_dir = TempDir::new().unwrap();
    let target = out_dir.path().join("nested/memo.docx");

    let output = app
        .exports
        .export(doc.id.as_str(), "docx", Some(&target))
        .await
        .unwrap();

    assert_eq!(output, target);
    let args = std::fs::read_to_string(format!("{}.args", target.display())).unwrap();
    assert!(!args.contains("--pdf-engine"));
}

#[tokio::test]
async fn unavailable_browser_falls_back_to_converter() {
    let env = TestEnv::new();
    let converter = env.script("fake-pandoc", COPYING_CONVERTER);
    let app = env.app(ExportConfig {
        browser_enabled: true,
        browser_path: Some(PathBuf::from("/definitely/not/a/browser")),
        converter_path: converter.to_string_lossy().to_string(),
        ..Default::default()
    });
    let doc = app.documents.create_document("Fallback", "<p>x</p>").await.unwrap();

    let output = app.exports.export(doc.id.as_str(), "pdf", None).await.unwrap();

    assert_eq!(std::fs::read_to_string(output).unwrap(), "<p>x</p>");
    assert!(temp_exports(&app.documents.document_path(&doc.id)).is_empty());
}

#[tokio::test]
async fn missing_converter_reports_every_attempt() {
    let env = TestEnv::new();
    let app = env.app(ExportConfig {
        browser_enabled: true,
        browser_path: Some(PathBuf::from("/definitely/not/a/browser")),
        converter_path: "/definitely/not/pandoc".to_string(),
        ..Default::default()
    });
    let doc = app.documents.create_document("Stuck", "<p/>").await.unwrap();

    let err = app.exports.export(doc.id.as_str(), "pdf", None).await.unwrap_err();

    match &err {
        ExportError::AllRenderersFailed { attempts, .. } => {
            assert_eq!(attempts.len(), 2);
            assert_eq!(attempts[0].renderer, "chrome");
            assert_eq!(attempts[1].renderer, "pandoc");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(matches!(
        err.last_render_error(),
        Some(RenderError::Unavailable { .. })
    ));
    assert_eq!(err.code(), ErrorCode::RendererUnavailable);
    assert!(temp_exports(&app.documents.document_path(&doc.id)).is_empty());
}

#[tokio::test]
async fn hanging_converter_is_killed_at_timeout() {
    let env = TestEnv::new();
    let converter = env.script("slow-pandoc", "#!/bin/sh\nexec sleep 30\n");
    let app = env.converter_only(&converter, 1);
    let doc = app.documents.create_document("Slow", "<p/>").await.unwrap();
    let started = Instant::now();

    let err = app.exports.export(doc.id.as_str(), "docx", None).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::RenderTimeout);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(temp_exports(&app.documents.document_path(&doc.id)).is_empty());
}

#[tokio::test]
async fn converter_failure_carries_stderr() {
    let env = TestEnv::new();
    let converter = env.script(
        "broken-pandoc",
        "#!/bin/sh\necho 'xelatex not found' >&2\nexit 43\n",
    );
    let app = env.converter_only(&converter, 10);
    let doc = app.documents.create_document("Broken", "<p/>").await.unwrap();

    let err = app.exports.export(doc.id.as_str(), "pdf", None).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::RenderFailed);
    assert!(err.to_string().contains("xelatex not found"));
}

#[tokio::test]
async fn unsupported_format_never_reaches_converter() {
    let env = TestEnv::new();
    let marker = env.tools.path().join("ran");
    let converter = env.script(
        "marking-pandoc",
        &format!("#!/bin/sh\ntouch '{}'\n", marker.display()),
    );
    let app = env.converter_only(&converter, 10);
    let doc = app.documents.create_document("Doc", "<p/>").await.unwrap();

    let err = app.exports.export(doc.id.as_str(), "odt", None).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::ValidationFailed);
    assert!(!marker.exists());
}
