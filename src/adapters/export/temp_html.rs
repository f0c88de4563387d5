//! Scoped temporary HTML inputs for renderers.

use std::path::Path;

use tempfile::NamedTempFile;

use crate::ports::RenderError;

/// Writes `html` to a fresh `temp_export*.html` file inside `dir`.
///
/// The file is removed when the returned guard drops, whichever way the
/// render attempt ends.
pub(crate) async fn write_temp_html(
    dir: &Path,
    html: &str,
    renderer: &str,
) -> Result<NamedTempFile, RenderError> {
    let temp = tempfile::Builder::new()
        .prefix("temp_export")
        .suffix(".html")
        .tempfile_in(dir)
        .map_err(|e| {
            RenderError::io(
                renderer,
                format!("failed to create temp file in {}: {}", dir.display(), e),
            )
        })?;

    tokio::fs::write(temp.path(), html).await.map_err(|e| {
        RenderError::io(
            renderer,
            format!("failed to write {}: {}", temp.path().display(), e),
        )
    })?;

    Ok(temp)
}
