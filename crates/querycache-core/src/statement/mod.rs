//! Statement cache: store, fetch, validate and invalidate SQL templates.
//!
//! A cached template is reusable only while the number of placeholders it
//! contains equals the number of bind parameters freshly collected from the
//! query. That count is a cheap stand-in for "the query still has the same
//! shape"; two shapes with the same parameter count are indistinguishable.

mod key;
mod limit;

pub use key::CacheKey;
pub use limit::{limit_clause, strip_limit};

use crate::cache::CacheBackend;
use crate::error::Result;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// Bind markers (`:name`) and the `::` cast operator, which must not count.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::|:[A-Za-z_][A-Za-z0-9_]*").unwrap());

/// Count the bind markers in `sql`.
pub fn count_placeholders(sql: &str) -> usize {
    PLACEHOLDER
        .find_iter(sql)
        .filter(|m| m.as_str() != "::")
        .count()
}

/// Outcome of [`StatementCache::fetch_validated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// The key is empty; the backend was not consulted.
    Disabled,
    /// No entry is stored under the key.
    Miss,
    /// An entry existed but its placeholder count did not match. It has been deleted.
    Stale { cached: usize, expected: usize },
    /// The stored template can be reused.
    Hit(String),
}

impl CacheLookup {
    pub fn is_reusable(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    /// The reusable template, if any.
    pub fn into_sql(self) -> Option<String> {
        match self {
            CacheLookup::Hit(sql) => Some(sql),
            _ => None,
        }
    }
}

/// Statement template cache built on a [`CacheBackend`].
#[derive(Clone)]
pub struct StatementCache {
    backend: Arc<dyn CacheBackend>,
    lifetime: Duration,
}

impl StatementCache {
    pub fn new(backend: Arc<dyn CacheBackend>, lifetime: Duration) -> Self {
        Self { backend, lifetime }
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Look up `key` and check that its template takes `expected` parameters.
    ///
    /// A template with the wrong placeholder count is deleted so that the next
    /// execution stores a fresh one instead of failing validation again.
    pub fn fetch_validated(&self, key: &CacheKey, expected: usize) -> Result<CacheLookup> {
        if !key.is_enabled() {
            return Ok(CacheLookup::Disabled);
        }

        if !self.backend.contains(key.as_str())? {
            return Ok(CacheLookup::Miss);
        }

        // Entry may have expired or been deleted between the two calls
        let Some(sql) = self.backend.fetch(key.as_str())? else {
            return Ok(CacheLookup::Miss);
        };

        let cached = count_placeholders(&sql);
        if cached != expected {
            self.backend.delete(key.as_str())?;
            return Ok(CacheLookup::Stale { cached, expected });
        }

        Ok(CacheLookup::Hit(sql))
    }

    /// Store `sql` under `key` with the configured lifetime.
    ///
    /// No-op for the empty key. Concurrent writers are not coordinated; the
    /// last store wins.
    pub fn store(&self, key: &CacheKey, sql: &str) -> Result<()> {
        self.store_with_lifetime(key, sql, self.lifetime)
    }

    /// Store `sql` under `key` with an explicit lifetime.
    pub fn store_with_lifetime(&self, key: &CacheKey, sql: &str, lifetime: Duration) -> Result<()> {
        if !key.is_enabled() {
            return Ok(());
        }
        self.backend.store(key.as_str(), sql, lifetime)
    }

    /// Whether a template is stored under `key`, without validating it.
    pub fn contains(&self, key: &CacheKey) -> Result<bool> {
        if !key.is_enabled() {
            return Ok(false);
        }
        self.backend.contains(key.as_str())
    }

    /// Raw template stored under `key`, without validating it.
    pub fn fetch(&self, key: &CacheKey) -> Result<Option<String>> {
        if !key.is_enabled() {
            return Ok(None);
        }
        self.backend.fetch(key.as_str())
    }

    /// Drop the template stored under `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &CacheKey) -> Result<bool> {
        if !key.is_enabled() {
            return Ok(false);
        }
        self.backend.delete(key.as_str())
    }
}
