//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application layer and the outside world. Adapters implement these ports.
//!
//! - `DocumentStore` - Persistence of documents, metadata and media
//! - `DocumentRenderer` - One export backend (browser, converter)

mod document_renderer;
mod document_store;

pub use document_renderer::{DocumentRenderer, ExportFormat, RenderError, RenderRequest};
pub use document_store::{DocumentStore, StorageError};
