//! Application layer - Document operations and export orchestration.
//!
//! This layer validates inputs and coordinates between ports. It owns no I/O
//! of its own beyond writing export artifacts.

mod document_service;
mod export_pipeline;

pub use document_service::{DocumentError, DocumentService};
pub use export_pipeline::{ExportError, ExportPipeline, RenderAttempt, RendererStatus};
