//! Query normalisation.
//!
//! Turns raw user input into a [`NormalizedKey`] used for cache identity.
//! Surrounding whitespace and letter case are insignificant: `" Vitamin D "`
//! and `"vitamin d"` share a key.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::{Result, WelloError};

/// Canonical, fixed-width cache identifier for a query.
///
/// Hex-encoded SHA-256 of the trimmed, lowercased query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalise a raw query into its cache key.
///
/// Returns [`WelloError::EmptyQuery`] when nothing but whitespace remains.
pub fn normalize(raw: &str) -> Result<NormalizedKey> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WelloError::EmptyQuery);
    }
    let digest = Sha256::digest(trimmed.to_lowercase().as_bytes());
    Ok(NormalizedKey(format!("{digest:x}")))
}
