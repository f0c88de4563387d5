//! HTML Docgen - Storage engine and export pipeline for HTML documents
//!
//! This crate keeps a collection of self-contained HTML documents on disk,
//! each under a generated human-readable id, and exports them to PDF or DOCX
//! through a chain of external renderers with timeouts and fallback.
//!
//! # Layout
//!
//! - `domain` - Document records, identifier generation, validation errors
//! - `ports` - Storage and renderer contracts
//! - `adapters` - Filesystem/in-memory stores, browser and pandoc renderers
//! - `application` - Document service and export pipeline
//! - `config`, `telemetry`, `bootstrap` - Environment-driven wiring

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
