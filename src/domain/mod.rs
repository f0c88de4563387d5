//! Domain layer containing document types and rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, validation errors, error codes)
//! - `document` - Document records, identifier generation, media kinds

pub mod document;
pub mod foundation;
