//! Document module - identifiers, records and media kinds.

mod document;
mod id;
mod media;

pub use document::{
    Document, DocumentMetadata, DocumentSummary, HTML_FILE_NAME, MEDIA_DIR_NAME,
    METADATA_FILE_NAME,
};
pub use id::{
    generate_document_id, is_valid_document_id, slugify_name, DocumentId, FALLBACK_SLUG,
    MAX_GENERATION_ATTEMPTS, MAX_ID_LENGTH, MAX_SLUG_LENGTH, SUFFIX_LENGTH,
};
pub use media::MediaType;
