//! Process-local in-memory backend.

use super::traits::CacheBackend;
use crate::error::Result;
use mini_moka::sync::Cache;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// The single process-wide instance handed out by [`ProcessLocalCache::global`].
static GLOBAL: LazyLock<Arc<ProcessLocalCache>> =
    LazyLock::new(|| Arc::new(ProcessLocalCache::new()));

/// In-memory backend scoped to the current process.
///
/// Entries never expire and are never evicted; they live until deleted or
/// until the process ends. Cloning shares the underlying map.
#[derive(Clone)]
pub struct ProcessLocalCache {
    entries: Cache<String, Arc<str>>,
}

impl ProcessLocalCache {
    /// Create an isolated store.
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// The shared store for this process, created on first use.
    pub fn global() -> Arc<ProcessLocalCache> {
        Arc::clone(&GLOBAL)
    }
}

impl Default for ProcessLocalCache {
    fn default() -> Self {
        Self::new()
    }
}

// Lookups go through `Arc<K>: Borrow<Q>`, which `Arc<String>` only satisfies
// for `Q = String`, hence the owned keys.
impl CacheBackend for ProcessLocalCache {
    fn fetch(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .get(&key.to_string())
            .map(|sql| sql.to_string()))
    }

    fn store(&self, key: &str, sql: &str, _ttl: Duration) -> Result<()> {
        self.entries.insert(key.to_string(), Arc::from(sql));
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.contains_key(&key.to_string()))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        let existed = self.entries.contains_key(&key);
        self.entries.invalidate(&key);
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_fetch() {
        let cache = ProcessLocalCache::new();
        cache
            .store("k1", "SELECT * FROM book WHERE id = :p1", Duration::ZERO)
            .unwrap();

        assert!(cache.contains("k1").unwrap());
        assert_eq!(
            cache.fetch("k1").unwrap().as_deref(),
            Some("SELECT * FROM book WHERE id = :p1")
        );
        assert!(cache.fetch("k2").unwrap().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = ProcessLocalCache::new();
        cache.store("k1", "SELECT 1", Duration::ZERO).unwrap();
        cache.store("k1", "SELECT 2", Duration::ZERO).unwrap();

        assert_eq!(cache.fetch("k1").unwrap().as_deref(), Some("SELECT 2"));
    }

    #[test]
    fn test_delete() {
        let cache = ProcessLocalCache::new();
        cache.store("k1", "SELECT 1", Duration::ZERO).unwrap();

        assert!(cache.delete("k1").unwrap());
        assert!(!cache.contains("k1").unwrap());
        assert!(!cache.delete("k1").unwrap());
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = ProcessLocalCache::new();
        let b = ProcessLocalCache::new();
        a.store("k1", "SELECT 1", Duration::ZERO).unwrap();

        assert!(!b.contains("k1").unwrap());
        assert!(a.clone().contains("k1").unwrap());
    }
}
