//! Foundation module - Shared domain primitives.
//!
//! Contains value objects and error types that form the vocabulary of the
//! document domain.

mod errors;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use timestamp::Timestamp;
