//! Caller-assigned cache keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a query shape in the statement cache.
///
/// The empty key means "don't cache this query". Uniqueness is up to the
/// caller: two differently shaped queries sharing a key are only told apart by
/// the placeholder-count check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The empty key, which turns caching off.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the key is non-empty and lookups should happen.
    pub fn is_enabled(&self) -> bool {
        !self.0.is_empty()
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
