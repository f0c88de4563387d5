//! Document identifiers: `<slug>-<suffix>` keys derived from a document name.
//!
//! Identifiers are human-readable so they can be typed in a terminal, and carry
//! a short random hex suffix so no global counter or lock is needed to keep
//! them unique.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::foundation::ValidationError;

/// Maximum length of the slug portion of an identifier.
pub const MAX_SLUG_LENGTH: usize = 30;

/// Length of the random hex suffix.
pub const SUFFIX_LENGTH: usize = 4;

/// Maximum length of a valid identifier: slug, hyphen, suffix.
pub const MAX_ID_LENGTH: usize = MAX_SLUG_LENGTH + SUFFIX_LENGTH + 1;

/// Number of suffix draws before falling back to a double-length suffix.
pub const MAX_GENERATION_ATTEMPTS: usize = 100;

/// Slug used when a name normalizes to nothing.
pub const FALLBACK_SLUG: &str = "document";

/// Unique identifier for a stored document, e.g. `my-report-a3f9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parses an identifier, rejecting anything that fails [`is_valid_document_id`].
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::empty_field("document_id"));
        }
        if !is_valid_document_id(&value) {
            return Err(ValidationError::invalid_format(
                "document_id",
                format!(
                    "'{}' must contain a hyphen and be at most {} characters",
                    value, MAX_ID_LENGTH
                ),
            ));
        }
        Ok(Self(value))
    }

    /// Wraps an identifier without re-validating it.
    ///
    /// Used for freshly generated ids (the double-length fallback suffix can
    /// exceed [`MAX_ID_LENGTH`]) and for directory names found on disk.
    pub(crate) fn unchecked(value: String) -> Self {
        Self(value)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the slug portion (everything before the last hyphen).
    pub fn slug(&self) -> &str {
        self.0.rsplit_once('-').map(|(slug, _)| slug).unwrap_or(&self.0)
    }

    /// Returns the random suffix (everything after the last hyphen).
    pub fn suffix(&self) -> &str {
        self.0.rsplit_once('-').map(|(_, suffix)| suffix).unwrap_or("")
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Syntactic sanity check for an identifier.
///
/// Valid iff non-empty, contains at least one hyphen, and is at most
/// [`MAX_ID_LENGTH`] characters. Says nothing about whether the document exists.
pub fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty() && id.contains('-') && id.chars().count() <= MAX_ID_LENGTH
}

/// Normalizes a free-text name into the slug portion of an identifier.
///
/// Lowercase, ASCII-transliterated, hyphen-joined, truncated to
/// [`MAX_SLUG_LENGTH`]; an empty result becomes [`FALLBACK_SLUG`].
pub fn slugify_name(name: &str) -> String {
    let mut slug = slug::slugify(name);
    // slugify only emits [a-z0-9-], so byte truncation is char-safe
    slug.truncate(MAX_SLUG_LENGTH);
    if slug.is_empty() {
        slug.push_str(FALLBACK_SLUG);
    }
    slug
}

/// Generates a unique identifier for `name`.
///
/// `exists` is consulted for every candidate; a taken candidate gets a fresh
/// suffix, up to [`MAX_GENERATION_ATTEMPTS`] times. After that a double-length
/// suffix is returned without another existence check. Never fails.
pub async fn generate_document_id<F, Fut>(name: &str, mut exists: F) -> DocumentId
where
    F: FnMut(DocumentId) -> Fut,
    Fut: Future<Output = bool>,
{
    let slug = slugify_name(name);

    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let candidate = DocumentId::unchecked(format!("{}-{}", slug, random_suffix()));
        if !exists(candidate.clone()).await {
            return candidate;
        }
    }

    tracing::warn!(
        slug = %slug,
        attempts = MAX_GENERATION_ATTEMPTS,
        "Identifier suffixes exhausted, falling back to long suffix"
    );
    DocumentId::unchecked(format!("{}-{}{}", slug, random_suffix(), random_suffix()))
}

/// Draws a [`SUFFIX_LENGTH`]-character lowercase hex suffix.
fn random_suffix() -> String {
    let mut bytes = [0u8; SUFFIX_LENGTH / 2];
    if let Err(err) = getrandom::getrandom(&mut bytes) {
        tracing::warn!(error = %err, "OS randomness unavailable, using weak suffix source");
        weak_random_bytes(&mut bytes);
    }
    hex::encode(bytes)
}

/// Clock/pid/counter hash. Only used when the OS source fails.
fn weak_random_bytes(buf: &mut [u8]) {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(nanos.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    let digest = hasher.finalize();

    for (byte, value) in buf.iter_mut().zip(digest.iter()) {
        *byte = *value;
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════
