//! DocumentService - Validated document operations over a DocumentStore.
//!
//! Every operation checks its inputs before touching storage, then delegates
//! to the injected store. Identifier generation happens here, consulting the
//! store for collisions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::domain::document::{
    generate_document_id, Document, DocumentId, DocumentSummary, MediaType,
};
use crate::domain::foundation::{ErrorCode, Timestamp, ValidationError};
use crate::ports::{DocumentStore, StorageError};

/// Errors surfaced by document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Document not found: {document_id}")]
    NotFound { document_id: String },

    #[error("Failed to {operation} document {document_id}: {source}")]
    Storage {
        operation: &'static str,
        document_id: String,
        #[source]
        source: StorageError,
    },
}

impl DocumentError {
    /// Wraps a store failure, lifting not-found out of the storage variant.
    pub fn storage(operation: &'static str, document_id: impl Into<String>, source: StorageError) -> Self {
        let document_id = document_id.into();
        if source.is_not_found() {
            return Self::NotFound { document_id };
        }
        Self::Storage {
            operation,
            document_id,
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::NotFound { .. } => ErrorCode::DocumentNotFound,
            Self::Storage { source, .. } => source.code(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Document operations.
///
/// # Usage
///
/// ```rust,ignore
/// let service = DocumentService::new(Arc::new(LocalDocumentStore::new(root)));
///
/// let doc = service.create_document("My Report", "<h1>Hi</h1>").await?;
/// let media = service.add_media(doc.id.as_str(), "/tmp/pic.png", "image").await?;
/// assert_eq!(media, "media/pic.png");
/// ```
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Creates a document with a freshly generated id.
    pub async fn create_document(
        &self,
        name: &str,
        html_content: &str,
    ) -> Result<Document, DocumentError> {
        require_non_empty("name", name)?;
        require_non_empty("html_content", html_content)?;

        let store = Arc::clone(&self.store);
        let id = generate_document_id(name, move |candidate| {
            let store = Arc::clone(&store);
            async move { store.exists(&candidate).await }
        })
        .await;

        let document = Document::new(id, name, html_content, Timestamp::now());

        self.store
            .create(&document)
            .await
            .map_err(|e| DocumentError::storage("create", document.id.as_str(), e))?;

        tracing::info!(document_id = %document.id, name = %document.name, "Document created");
        Ok(document)
    }

    /// Replaces a document's HTML and refreshes `updated_at`.
    pub async fn update_document(
        &self,
        document_id: &str,
        html_content: &str,
    ) -> Result<Document, DocumentError> {
        let id = DocumentId::parse(document_id)?;
        require_non_empty("html_content", html_content)?;

        let mut document = self
            .store
            .get(&id)
            .await
            .map_err(|e| DocumentError::storage("read", id.as_str(), e))?;

        document.replace_content(html_content);

        self.store
            .update(&document)
            .await
            .map_err(|e| DocumentError::storage("update", id.as_str(), e))?;

        tracing::info!(document_id = %id, "Document updated");
        Ok(document)
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Document, DocumentError> {
        let id = DocumentId::parse(document_id)?;

        self.store
            .get(&id)
            .await
            .map_err(|e| DocumentError::storage("read", id.as_str(), e))
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>, DocumentError> {
        self.store
            .list()
            .await
            .map_err(|e| DocumentError::storage("list", "*", e))
    }

    /// Copies a media file into the document and returns its relative path.
    pub async fn add_media(
        &self,
        document_id: &str,
        source_path: &str,
        media_type: &str,
    ) -> Result<String, DocumentError> {
        let id = DocumentId::parse(document_id)?;
        require_non_empty("file_path", source_path)?;
        let media_type: MediaType = media_type.parse()?;

        let relative = self
            .store
            .copy_media_file(&id, Path::new(source_path))
            .await
            .map_err(|e| DocumentError::storage("add media to", id.as_str(), e))?;

        tracing::info!(document_id = %id, media_type = %media_type, path = %relative, "Media added");
        Ok(relative)
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<(), DocumentError> {
        let id = DocumentId::parse(document_id)?;

        self.store
            .delete(&id)
            .await
            .map_err(|e| DocumentError::storage("delete", id.as_str(), e))?;

        tracing::info!(document_id = %id, "Document deleted");
        Ok(())
    }

    /// Directory holding the document's files. No I/O.
    pub fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.store.document_path(id)
    }

    /// Path of the document's HTML body. No I/O.
    pub fn html_path(&self, id: &DocumentId) -> PathBuf {
        self.store.html_path(id)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryDocumentStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // ───────────────────────────────────────────────────────────────
    // Test helpers
    // ───────────────────────────────────────────────────────────────

    fn create_service() -> (DocumentService, InMemoryDocumentStore) {
        let store = InMemoryDocumentStore::new();
        let service = DocumentService::new(Arc::new(store.clone()));
        (service, store)
    }

    /// Store that reports the first `taken` existence checks as collisions.
    struct CollidingStore {
        inner: InMemoryDocumentStore,
        taken: usize,
        checked: Mutex<Vec<DocumentId>>,
    }

    impl CollidingStore {
        fn new(taken: usize) -> Self {
            Self {
                inner: InMemoryDocumentStore::new(),
                taken,
                checked: Mutex::new(Vec::new()),
            }
        }

        fn checked(&self) -> Vec<DocumentId> {
            self.checked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentStore for CollidingStore {
        async fn exists(&self, id: &DocumentId) -> bool {
            let mut checked = self.checked.lock().unwrap();
            checked.push(id.clone());
            checked.len() <= self.taken
        }

        async fn create(&self, document: &Document) -> Result<(), StorageError> {
            self.inner.create(document).await
        }

        async fn update(&self, document: &Document) -> Result<(), StorageError> {
            self.inner.update(document).await
        }

        async fn get(&self, id: &DocumentId) -> Result<Document, StorageError> {
            self.inner.get(id).await
        }

        async fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
            self.inner.list().await
        }

        async fn copy_media_file(
            &self,
            id: &DocumentId,
            source: &Path,
        ) -> Result<String, StorageError> {
            self.inner.copy_media_file(id, source).await
        }

        async fn delete(&self, id: &DocumentId) -> Result<(), StorageError> {
            self.inner.delete(id).await
        }

        fn document_path(&self, id: &DocumentId) -> PathBuf {
            self.inner.document_path(id)
        }

        fn html_path(&self, id: &DocumentId) -> PathBuf {
            self.inner.html_path(id)
        }
    }

    /// Store whose writes always fail.
    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn exists(&self, _id: &DocumentId) -> bool {
            false
        }

        async fn create(&self, _document: &Document) -> Result<(), StorageError> {
            Err(StorageError::io("disk full"))
        }

        async fn update(&self, _document: &Document) -> Result<(), StorageError> {
            Err(StorageError::io("disk full"))
        }

        async fn get(&self, id: &DocumentId) -> Result<Document, StorageError> {
            Err(StorageError::not_found(id.as_str()))
        }

        async fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
            Err(StorageError::io("permission denied"))
        }

        async fn copy_media_file(
            &self,
            id: &DocumentId,
            _source: &Path,
        ) -> Result<String, StorageError> {
            Err(StorageError::not_found(id.as_str()))
        }

        async fn delete(&self, id: &DocumentId) -> Result<(), StorageError> {
            Err(StorageError::not_found(id.as_str()))
        }

        fn document_path(&self, id: &DocumentId) -> PathBuf {
            PathBuf::from("/failing").join(id.as_str())
        }

        fn html_path(&self, id: &DocumentId) -> PathBuf {
            self.document_path(id).join("index.html")
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Create tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_document_generates_slugged_id() {
        let (service, store) = create_service();

        let doc = service.create_document("My Report", "<h1>Hi</h1>").await.unwrap();

        assert_eq!(doc.id.slug(), "my-report");
        assert_eq!(doc.id.suffix().len(), 4);
        assert!(doc.id.suffix().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(doc.created_at, doc.updated_at);
        assert!(store.exists(&doc.id).await);
    }

    #[tokio::test]
    async fn create_document_rejects_empty_inputs() {
        let (service, store) = create_service();

        let no_name = service.create_document("", "<p/>").await.unwrap_err();
        let no_html = service.create_document("Name", "").await.unwrap_err();

        assert!(matches!(no_name, DocumentError::Validation(ValidationError::EmptyField { ref field }) if field == "name"));
        assert!(matches!(no_html, DocumentError::Validation(ValidationError::EmptyField { ref field }) if field == "html_content"));
        assert_eq!(no_name.code(), ErrorCode::ValidationFailed);
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn create_document_redraws_on_collision() {
        let store = Arc::new(CollidingStore::new(3));
        let service = DocumentService::new(store.clone());

        let doc = service.create_document("Notes", "<p/>").await.unwrap();

        let checked = store.checked();
        assert_eq!(checked.len(), 4);
        assert_eq!(checked.last().unwrap(), &doc.id);
    }

    #[tokio::test]
    async fn create_document_unicode_name_uses_fallback_slug() {
        let (service, _store) = create_service();

        let doc = service.create_document("!!!", "<p/>").await.unwrap();

        assert_eq!(doc.id.slug(), "document");
    }

    #[tokio::test]
    async fn create_document_wraps_storage_failure() {
        let service = DocumentService::new(Arc::new(FailingStore));

        let err = service.create_document("Doc", "<p/>").await.unwrap_err();

        assert!(matches!(err, DocumentError::Storage { operation: "create", .. }));
        assert_eq!(err.code(), ErrorCode::StorageError);
        assert!(err.to_string().contains("disk full"));
    }

    // ───────────────────────────────────────────────────────────────
    // Update tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn update_document_replaces_content_and_keeps_identity() {
        let (service, _store) = create_service();
        let created = service.create_document("Doc", "<p>v1</p>").await.unwrap();

        let updated = service
            .update_document(created.id.as_str(), "<p>v2</p>")
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.created_at, created.created_at);
        assert!(!updated.updated_at.is_before(&created.updated_at));
        assert_eq!(
            service.get_document(created.id.as_str()).await.unwrap().html_content,
            "<p>v2</p>"
        );
    }

    #[tokio::test]
    async fn update_document_is_idempotent_on_content() {
        let (service, _store) = create_service();
        let created = service.create_document("Doc", "<p>v1</p>").await.unwrap();

        let first = service.update_document(created.id.as_str(), "<p>v2</p>").await.unwrap();
        let second = service.update_document(created.id.as_str(), "<p>v2</p>").await.unwrap();

        assert_eq!(first.html_content, second.html_content);
        assert!(!second.updated_at.is_before(&first.updated_at));
    }

    #[tokio::test]
    async fn update_document_validates_before_storage() {
        let (service, _store) = create_service();

        let bad_id = service.update_document("nohyphen", "<p/>").await.unwrap_err();
        let empty = service.update_document("doc-0001", "").await.unwrap_err();

        assert!(matches!(bad_id, DocumentError::Validation(_)));
        assert!(matches!(empty, DocumentError::Validation(_)));
    }

    #[tokio::test]
    async fn update_document_missing_is_not_found() {
        let (service, _store) = create_service();

        let err = service.update_document("missing-0000", "<p/>").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.code(), ErrorCode::DocumentNotFound);
    }

    // ───────────────────────────────────────────────────────────────
    // Get / list / delete tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn get_document_rejects_invalid_ids() {
        let (service, _store) = create_service();
        let too_long = format!("{}-abcd", "a".repeat(31));

        for id in ["", "nohyphen", too_long.as_str()] {
            let err = service.get_document(id).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationFailed, "id {:?}", id);
        }
    }

    #[tokio::test]
    async fn list_documents_returns_every_created_document() {
        let (service, _store) = create_service();
        for i in 0..5 {
            service
                .create_document(&format!("Doc {}", i), "<p/>")
                .await
                .unwrap();
        }

        let summaries = service.list_documents().await.unwrap();

        assert_eq!(summaries.len(), 5);
        assert!(summaries.iter().all(|s| s.file_path == format!("{}/index.html", s.id)));
    }

    #[tokio::test]
    async fn list_documents_wraps_storage_failure() {
        let service = DocumentService::new(Arc::new(FailingStore));

        let err = service.list_documents().await.unwrap_err();

        assert!(matches!(err, DocumentError::Storage { operation: "list", .. }));
    }

    #[tokio::test]
    async fn delete_document_removes_it() {
        let (service, _store) = create_service();
        let doc = service.create_document("Doc", "<p/>").await.unwrap();

        service.delete_document(doc.id.as_str()).await.unwrap();

        assert!(service.get_document(doc.id.as_str()).await.unwrap_err().is_not_found());
        assert!(service.list_documents().await.unwrap().is_empty());
    }

    // ───────────────────────────────────────────────────────────────
    // Media tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn add_media_returns_relative_path() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("pic.png");
        std::fs::write(&source, b"png").unwrap();
        let (service, _store) = create_service();
        let doc = service.create_document("Doc", "<p/>").await.unwrap();

        let relative = service
            .add_media(doc.id.as_str(), source.to_str().unwrap(), "image")
            .await
            .unwrap();

        assert_eq!(relative, "media/pic.png");
    }

    #[tokio::test]
    async fn add_media_validates_inputs() {
        let (service, _store) = create_service();
        let doc = service.create_document("Doc", "<p/>").await.unwrap();

        let bad_type = service
            .add_media(doc.id.as_str(), "/tmp/pic.png", "audio")
            .await
            .unwrap_err();
        let empty_path = service.add_media(doc.id.as_str(), "", "image").await.unwrap_err();
        let bad_id = service.add_media("bad", "/tmp/pic.png", "image").await.unwrap_err();

        assert!(matches!(bad_type, DocumentError::Validation(ValidationError::Unsupported { .. })));
        assert!(matches!(empty_path, DocumentError::Validation(ValidationError::EmptyField { .. })));
        assert!(matches!(bad_id, DocumentError::Validation(_)));
    }

    #[tokio::test]
    async fn add_media_to_missing_document_is_not_found() {
        let (service, _store) = create_service();

        let err = service
            .add_media("missing-0000", "/tmp/pic.png", "video")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    // ───────────────────────────────────────────────────────────────
    // Path tests
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn paths_delegate_to_store() {
        let (service, _store) = create_service();
        let id = DocumentId::parse("doc-0001").unwrap();

        assert_eq!(service.document_path(&id), PathBuf::from("/memory/doc-0001"));
        assert_eq!(service.html_path(&id), PathBuf::from("/memory/doc-0001/index.html"));
    }
}
