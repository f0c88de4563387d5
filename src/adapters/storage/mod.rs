//! Storage Adapters
//!
//! Implementations of the DocumentStore port.
//!
//! ## Available Adapters
//!
//! - **LocalDocumentStore** - One directory per document on the local filesystem
//! - **InMemoryDocumentStore** - Stores documents in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryDocumentStore, LocalDocumentStore};
//!
//! // Production: filesystem storage
//! let store = LocalDocumentStore::new("/home/me/.simple_html_docs");
//!
//! // Testing: in-memory storage
//! let store = InMemoryDocumentStore::new();
//! ```

mod in_memory_document_store;
mod local_document_store;

pub use in_memory_document_store::InMemoryDocumentStore;
pub use local_document_store::LocalDocumentStore;
