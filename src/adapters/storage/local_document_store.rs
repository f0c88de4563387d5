//! Local Filesystem Store Adapter - Implementation of DocumentStore.
//!
//! Stores each document as a directory holding the HTML body, a JSON metadata
//! sidecar and a media folder. Body and metadata writes go through a
//! temp-then-rename step so readers never see half-written files.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::document::{
    Document, DocumentId, DocumentMetadata, DocumentSummary, HTML_FILE_NAME, MEDIA_DIR_NAME,
    METADATA_FILE_NAME,
};
use crate::ports::{DocumentStore, StorageError};

/// Permissions for directories created by the store (owner rwx, others rx).
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Local filesystem storage for HTML documents.
///
/// # Directory Structure
///
/// ```text
/// {root}/
/// ├── my-report-a3f9/
/// │   ├── index.html
/// │   ├── metadata.json
/// │   └── media/
/// │       └── pic.png
/// └── notes-0b7c/
///     ├── index.html
///     ├── metadata.json
///     └── media/
/// ```
///
/// # Usage
///
/// ```rust,ignore
/// let store = LocalDocumentStore::new("/var/docs");
///
/// store.create(&document).await?;
/// let doc = store.get(&document.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    /// Root directory holding one subdirectory per document.
    root: PathBuf,
}

impl LocalDocumentStore {
    /// Creates a store rooted at `root`. The directory is not created here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_dir(&self, id: &DocumentId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn metadata_file(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(METADATA_FILE_NAME)
    }

    fn media_dir(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(MEDIA_DIR_NAME)
    }

    /// Rejects ids that would not map to exactly one directory under the root.
    fn check_id(id: &DocumentId) -> Result<(), StorageError> {
        let has_separator = id.as_str().contains(|c: char| c == '/' || c == '\\');
        let mut components = Path::new(id.as_str()).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !has_separator => Ok(()),
            _ => Err(StorageError::invalid_path(
                id.as_str(),
                "document id must be a single path component",
            )),
        }
    }

    /// Checks the id and then existence; used by every operation on an existing document.
    async fn require_existing(&self, id: &DocumentId) -> Result<(), StorageError> {
        Self::check_id(id)?;
        if !self.exists(id).await {
            return Err(StorageError::not_found(id.as_str()));
        }
        Ok(())
    }

    /// Ensures a directory exists.
    async fn ensure_dir(path: &Path) -> Result<(), StorageError> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(DIR_MODE);

        builder
            .create(path)
            .await
            .map_err(|e| StorageError::io_at("create directory", path, e))
    }

    /// Writes `contents` to `path` via a sibling temp file and rename.
    async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| StorageError::io_at("create temp file", &temp_path, e))?;

        file.write_all(contents)
            .await
            .map_err(|e| StorageError::io_at("write to temp file", &temp_path, e))?;

        file.sync_all()
            .await
            .map_err(|e| StorageError::io_at("sync temp file", &temp_path, e))?;

        fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })
    }

    async fn write_document_files(&self, document: &Document) -> Result<(), StorageError> {
        Self::write_atomic(
            &self.html_path(&document.id),
            document.html_content.as_bytes(),
        )
        .await?;

        let metadata = serde_json::to_vec_pretty(&document.metadata()).map_err(|e| {
            StorageError::invalid_metadata(document.id.as_str(), e.to_string())
        })?;
        Self::write_atomic(&self.metadata_file(&document.id), &metadata).await
    }

    async fn read_metadata(&self, id: &DocumentId) -> Result<DocumentMetadata, StorageError> {
        let path = self.metadata_file(id);
        let data = fs::read(&path)
            .await
            .map_err(|e| StorageError::io_at("read", &path, e))?;

        serde_json::from_slice(&data)
            .map_err(|e| StorageError::invalid_metadata(id.as_str(), e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn exists(&self, id: &DocumentId) -> bool {
        if Self::check_id(id).is_err() {
            return false;
        }
        fs::metadata(self.html_path(id))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn create(&self, document: &Document) -> Result<(), StorageError> {
        Self::check_id(&document.id)?;

        Self::ensure_dir(&self.document_dir(&document.id)).await?;
        Self::ensure_dir(&self.media_dir(&document.id)).await?;
        self.write_document_files(document).await?;

        tracing::debug!(document_id = %document.id, "Document files written");
        Ok(())
    }

    async fn update(&self, document: &Document) -> Result<(), StorageError> {
        self.require_existing(&document.id).await?;
        self.write_document_files(document).await?;

        tracing::debug!(document_id = %document.id, "Document files rewritten");
        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> Result<Document, StorageError> {
        self.require_existing(id).await?;

        let html_path = self.html_path(id);
        let bytes = fs::read(&html_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::not_found(id.as_str()),
            _ => StorageError::io_at("read", &html_path, e),
        })?;
        // Invalid sequences become U+FFFD rather than failing the read
        let html_content = String::from_utf8(bytes).unwrap_or_else(|e| {
            tracing::warn!(
                document_id = %id,
                valid_up_to = e.utf8_error().valid_up_to(),
                "Document body is not valid UTF-8, decoding lossily"
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        });
        let metadata = self.read_metadata(id).await?;

        Ok(Document::from_parts(id.clone(), html_content, metadata))
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io_at("read root directory", &self.root, e)),
        };

        let mut summaries = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(format!("Failed to read directory entry: {}", e)))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }

            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let id = DocumentId::unchecked(name);

            if !self.exists(&id).await {
                continue;
            }

            match self.read_metadata(&id).await {
                Ok(metadata) => summaries.push(DocumentSummary::new(id, metadata)),
                Err(e) => {
                    tracing::warn!(document_id = %id, error = %e, "Skipping document with unreadable metadata");
                }
            }
        }

        summaries.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(summaries)
    }

    async fn copy_media_file(
        &self,
        id: &DocumentId,
        source: &Path,
    ) -> Result<String, StorageError> {
        self.require_existing(id).await?;

        // Only the base name is used, never the caller's directories
        let file_name = source.file_name().ok_or_else(|| {
            StorageError::invalid_path(
                source.display().to_string(),
                "source path has no file name",
            )
        })?;

        let media_dir = self.media_dir(id);
        Self::ensure_dir(&media_dir).await?;

        let destination = media_dir.join(file_name);
        fs::copy(source, &destination).await.map_err(|e| {
            StorageError::io(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                destination.display(),
                e
            ))
        })?;

        Ok(format!("{}/{}", MEDIA_DIR_NAME, file_name.to_string_lossy()))
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), StorageError> {
        self.require_existing(id).await?;

        let dir = self.document_dir(id);
        fs::remove_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io_at("delete", &dir, e))
    }

    fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id)
    }

    fn html_path(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(HTML_FILE_NAME)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
