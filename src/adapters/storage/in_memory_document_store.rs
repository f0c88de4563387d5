//! In-Memory Document Store Adapter
//!
//! Keeps documents and copied media in memory.
//! Useful for testing the service layer without touching the filesystem.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::document::{Document, DocumentId, DocumentSummary, HTML_FILE_NAME, MEDIA_DIR_NAME};
use crate::ports::{DocumentStore, StorageError};

#[derive(Debug, Clone)]
struct StoredDocument {
    document: Document,
    media: HashMap<String, Vec<u8>>,
}

/// In-memory storage for documents.
///
/// Paths returned by `document_path`/`html_path` are computed under a virtual
/// root and never touched.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    root: PathBuf,
    documents: Arc<RwLock<BTreeMap<DocumentId, StoredDocument>>>,
}

impl InMemoryDocumentStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::with_root("/memory")
    }

    /// Create a store that reports paths under `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            documents: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Get the number of stored documents
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Bytes of a copied media file, if present
    pub async fn media_bytes(&self, id: &DocumentId, file_name: &str) -> Option<Vec<u8>> {
        self.documents
            .read()
            .await
            .get(id)
            .and_then(|stored| stored.media.get(file_name).cloned())
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn exists(&self, id: &DocumentId) -> bool {
        self.documents.read().await.contains_key(id)
    }

    async fn create(&self, document: &Document) -> Result<(), StorageError> {
        let mut documents = self.documents.write().await;
        documents.insert(
            document.id.clone(),
            StoredDocument {
                document: document.clone(),
                media: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn update(&self, document: &Document) -> Result<(), StorageError> {
        let mut documents = self.documents.write().await;
        let stored = documents
            .get_mut(&document.id)
            .ok_or_else(|| StorageError::not_found(document.id.as_str()))?;
        stored.document = document.clone();
        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> Result<Document, StorageError> {
        let documents = self.documents.read().await;
        documents
            .get(id)
            .map(|stored| stored.document.clone())
            .ok_or_else(|| StorageError::not_found(id.as_str()))
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .map(|stored| stored.document.summary())
            .collect())
    }

    async fn copy_media_file(
        &self,
        id: &DocumentId,
        source: &Path,
    ) -> Result<String, StorageError> {
        if !self.exists(id).await {
            return Err(StorageError::not_found(id.as_str()));
        }

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                StorageError::invalid_path(
                    source.display().to_string(),
                    "source path has no file name",
                )
            })?;

        let bytes = tokio::fs::read(source)
            .await
            .map_err(|e| StorageError::io_at("read", source, e))?;

        let mut documents = self.documents.write().await;
        let stored = documents
            .get_mut(id)
            .ok_or_else(|| StorageError::not_found(id.as_str()))?;
        stored.media.insert(file_name.clone(), bytes);

        Ok(format!("{}/{}", MEDIA_DIR_NAME, file_name))
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), StorageError> {
        self.documents
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(id.as_str()))
    }

    fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn html_path(&self, id: &DocumentId) -> PathBuf {
        self.document_path(id).join(HTML_FILE_NAME)
    }
}
