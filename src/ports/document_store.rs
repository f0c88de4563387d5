//! Document Store Port - Persistence interface for documents.
//!
//! This port defines the contract for storing documents. The document service
//! depends on this trait, while adapters (like LocalDocumentStore) provide the
//! implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::document::{Document, DocumentId, DocumentSummary};
use crate::domain::foundation::ErrorCode;

/// Port for document persistence.
///
/// # Contract
///
/// Implementations must:
/// - Derive every path from the root and the document id alone
/// - Treat the presence of the HTML body as the only existence signal
/// - Keep the HTML body and metadata sidecar for an id in step
/// - Skip unreadable entries when listing instead of failing the listing
///
/// # Layout
///
/// ```text
/// {root}/
/// └── {id}/
///     ├── index.html
///     ├── metadata.json
///     └── media/
///         └── {filename}
/// ```
///
/// # Usage
///
/// ```rust,ignore
/// let store: &dyn DocumentStore = get_store();
///
/// store.create(&document).await?;
/// let relative = store.copy_media_file(&document.id, Path::new("/tmp/pic.png")).await?;
/// assert_eq!(relative, "media/pic.png");
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns `true` iff the document's HTML body is present.
    async fn exists(&self, id: &DocumentId) -> bool;

    /// Materializes a new document: directory, media directory, body, metadata.
    ///
    /// Partially created state is not rolled back on failure.
    async fn create(&self, document: &Document) -> Result<(), StorageError>;

    /// Overwrites the body and metadata of an existing document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the document doesn't exist.
    async fn update(&self, document: &Document) -> Result<(), StorageError>;

    /// Reads a document back from its body and metadata.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the document doesn't exist.
    async fn get(&self, id: &DocumentId) -> Result<Document, StorageError>;

    /// Lists every readable document.
    async fn list(&self) -> Result<Vec<DocumentSummary>, StorageError>;

    /// Copies a file into the document's media directory under its base name.
    ///
    /// Returns the path relative to the document directory (`media/<name>`).
    /// An existing file with the same name is overwritten.
    async fn copy_media_file(&self, id: &DocumentId, source: &Path)
        -> Result<String, StorageError>;

    /// Removes the document directory and everything in it.
    async fn delete(&self, id: &DocumentId) -> Result<(), StorageError>;

    /// Directory holding the document's files.
    fn document_path(&self, id: &DocumentId) -> PathBuf;

    /// Path of the document's HTML body.
    fn html_path(&self, id: &DocumentId) -> PathBuf;
}

/// Errors that can occur during document storage operations.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// No HTML body exists for the id.
    #[error("Document not found: {document_id}")]
    NotFound { document_id: String },

    /// Filesystem operation failed.
    #[error("IO error: {message}")]
    Io { message: String },

    /// The metadata sidecar could not be read back.
    #[error("Invalid metadata for document {document_id}: {message}")]
    InvalidMetadata {
        document_id: String,
        message: String,
    },

    /// A path could not be used safely.
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },
}

impl StorageError {
    /// Creates a not found error.
    pub fn not_found(document_id: impl Into<String>) -> Self {
        Self::NotFound {
            document_id: document_id.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an IO error naming the action and path that failed.
    pub fn io_at(action: &str, path: &Path, err: impl std::fmt::Display) -> Self {
        Self::io(format!("Failed to {} {}: {}", action, path.display(), err))
    }

    /// Creates an invalid metadata error.
    pub fn invalid_metadata(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            document_id: document_id.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for the not-found variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::DocumentNotFound,
            Self::Io { .. } | Self::InvalidMetadata { .. } | Self::InvalidPath { .. } => {
                ErrorCode::StorageError
            }
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::io(err.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
