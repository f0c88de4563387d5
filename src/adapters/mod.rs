//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `storage` - Document stores (local filesystem, in-memory)
//! - `export` - Renderers (headless browser, pandoc)

pub mod export;
pub mod storage;

pub use export::{ChromePdfRenderer, PandocRenderer};
pub use storage::{InMemoryDocumentStore, LocalDocumentStore};
