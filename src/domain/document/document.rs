//! Document records: the full document, its persisted metadata sidecar, and the
//! summary projection used for listings.

use serde::{Deserialize, Serialize};

use super::DocumentId;
use crate::domain::foundation::Timestamp;

/// Filename of the HTML body inside a document directory.
pub const HTML_FILE_NAME: &str = "index.html";

/// Filename of the metadata sidecar inside a document directory.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Name of the media subdirectory inside a document directory.
pub const MEDIA_DIR_NAME: &str = "media";

/// A self-contained HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Permanent identifier, derived from `name` at creation.
    pub id: DocumentId,
    /// Human-readable name given at creation.
    pub name: String,
    /// Full HTML body.
    pub html_content: String,
    pub created_at: Timestamp,
    /// Refreshed on every content replacement.
    pub updated_at: Timestamp,
}

impl Document {
    /// Creates a new document with both timestamps set to `now`.
    pub fn new(
        id: DocumentId,
        name: impl Into<String>,
        html_content: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            html_content: html_content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a document from its stored parts.
    pub fn from_parts(id: DocumentId, html_content: String, metadata: DocumentMetadata) -> Self {
        Self {
            id,
            name: metadata.name,
            html_content,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
        }
    }

    /// Replaces the HTML body and refreshes `updated_at`.
    pub fn replace_content(&mut self, html_content: impl Into<String>) {
        self.html_content = html_content.into();
        self.updated_at = Timestamp::now_not_before(&self.updated_at);
    }

    /// Returns the metadata sidecar for this document.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the listing projection for this document.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary::new(self.id.clone(), self.metadata())
    }
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Read-only listing entry, computed on read and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Path of the HTML body relative to the storage root: `<id>/index.html`.
    pub file_path: String,
}

impl DocumentSummary {
    /// Creates a summary from an id and its metadata.
    pub fn new(id: DocumentId, metadata: DocumentMetadata) -> Self {
        let file_path = format!("{}/{}", id, HTML_FILE_NAME);
        Self {
            id,
            name: metadata.name,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
            file_path,
        }
    }
}
