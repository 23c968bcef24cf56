//! Cache backend trait.

use crate::error::Result;
use std::time::Duration;

/// Key to SQL-template storage.
///
/// Entries are whole strings; a backend never edits a stored template in
/// place. All operations are synchronous and report their outcome only through
/// the return value.
pub trait CacheBackend: Send + Sync {
    /// Get the template stored under `key`.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    fn fetch(&self, key: &str) -> Result<Option<String>>;

    /// Store `sql` under `key`, replacing any existing entry.
    ///
    /// `ttl` is honored by backends that support expiry and ignored otherwise.
    fn store(&self, key: &str, sql: &str, ttl: Duration) -> Result<()>;

    /// Check whether a live entry exists for `key`.
    fn contains(&self, key: &str) -> Result<bool>;

    /// Delete the entry for `key`. Returns whether an entry was removed.
    fn delete(&self, key: &str) -> Result<bool>;
}
