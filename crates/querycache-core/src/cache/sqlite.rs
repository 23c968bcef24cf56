//! SQLite-backed store shared between processes.

use super::traits::CacheBackend;
use crate::error::{QueryCacheError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Fixed-width UTC timestamps so that expiry checks can compare text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Rows a reader may see: never-expiring or not yet expired.
const LIVE: &str = "(expires_at IS NULL OR expires_at > ?2)";

/// Cross-process statement store.
///
/// Every process that opens the same file sees the same entries. Entries expire
/// on their own once their TTL has passed; a zero TTL means the entry never
/// expires. Expired rows are invisible to reads and are physically removed by
/// [`SharedCache::purge_expired`].
/// Thread-safe via internal mutex on the connection.
pub struct SharedCache {
    /// Database connection (wrapped for thread safety).
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SharedCache {
    /// Open (or create) the store at `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| QueryCacheError::io_with_path(e, parent))?;
        }

        let conn = Connection::open(db_path).map_err(|e| QueryCacheError::Database {
            message: format!("Failed to open statement cache: {}", e),
            source: Some(e),
        })?;

        // WAL lets readers in other processes proceed while one process writes
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=5000;",
        )
        .map_err(|e| QueryCacheError::Database {
            message: format!("Failed to set pragmas: {}", e),
            source: Some(e),
        })?;

        let cache = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: db_path.to_path_buf(),
        };

        cache.init_schema()?;

        Ok(cache)
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| QueryCacheError::Database {
            message: format!("Failed to lock statement cache: {}", e),
            source: None,
        })
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS statement_cache (
                key TEXT PRIMARY KEY,
                sql TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                expires_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_statement_cache_expires
                ON statement_cache(expires_at);
            "#,
        )
        .map_err(|e| QueryCacheError::Database {
            message: format!("Failed to initialize statement cache schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }

    /// Store an entry with an explicit expiration time.
    pub fn store_with_expiry(&self, key: &str, sql: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.insert(key, sql, Some(expires_at))
    }

    /// Store an entry that stays until it is deleted.
    pub fn store_permanent(&self, key: &str, sql: &str) -> Result<()> {
        self.insert(key, sql, None)
    }

    fn insert(&self, key: &str, sql: &str, expires_at: Option<DateTime<Utc>>) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO statement_cache (key, sql, cached_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![key, sql, timestamp(Utc::now()), expires_at.map(timestamp)],
        )
        .map_err(|e| QueryCacheError::Database {
            message: format!("Failed to store statement: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }

    /// Remove expired entries. Returns the number of entries removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let conn = self.lock()?;

        let removed = conn
            .execute(
                "DELETE FROM statement_cache WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![timestamp(Utc::now())],
            )
            .map_err(|e| QueryCacheError::Database {
                message: format!("Failed to purge expired statements: {}", e),
                source: Some(e),
            })?;

        Ok(removed)
    }

    fn is_live(conn: &Connection, key: &str) -> Result<bool> {
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM statement_cache WHERE key = ?1 AND {}", LIVE),
                params![key, timestamp(Utc::now())],
                |row| row.get(0),
            )
            .map_err(|e| QueryCacheError::Database {
                message: format!("Failed to check statement cache: {}", e),
                source: Some(e),
            })?;

        Ok(count > 0)
    }
}

impl CacheBackend for SharedCache {
    fn fetch(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;

        conn.query_row(
            &format!("SELECT sql FROM statement_cache WHERE key = ?1 AND {}", LIVE),
            params![key, timestamp(Utc::now())],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| QueryCacheError::Database {
            message: format!("Failed to query statement cache: {}", e),
            source: Some(e),
        })
    }

    fn store(&self, key: &str, sql: &str, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return self.store_permanent(key, sql);
        }

        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| QueryCacheError::Validation {
                field: "lifetime".into(),
                message: format!("{:?} is out of range", ttl),
            })?;
        self.store_with_expiry(key, sql, expires_at)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        Self::is_live(&conn, key)
    }

    /// Removes the row for `key` whether or not it has expired, but only
    /// reports entries a reader could still have seen.
    fn delete(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let live = Self::is_live(&conn, key)?;

        conn.execute("DELETE FROM statement_cache WHERE key = ?1", params![key])
            .map_err(|e| QueryCacheError::Database {
                message: format!("Failed to delete statement: {}", e),
                source: Some(e),
            })?;

        Ok(live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (TempDir, SharedCache) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("statements.sqlite");
        let cache = SharedCache::open(&db_path).unwrap();
        (temp_dir, cache)
    }

    #[test]
    fn test_store_and_fetch() {
        let (_temp, cache) = create_test_cache();

        cache
            .store("k1", "SELECT * FROM book WHERE id = :p1", Duration::from_secs(3600))
            .unwrap();

        assert!(cache.contains("k1").unwrap());
        assert_eq!(
            cache.fetch("k1").unwrap().as_deref(),
            Some("SELECT * FROM book WHERE id = :p1")
        );
    }

    #[test]
    fn test_expired_entries_are_invisible() {
        let (_temp, cache) = create_test_cache();

        let expired_at = Utc::now() - chrono::Duration::seconds(1);
        cache
            .store_with_expiry("old", "SELECT 1", expired_at)
            .unwrap();

        assert!(!cache.contains("old").unwrap());
        assert!(cache.fetch("old").unwrap().is_none());
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let (_temp, cache) = create_test_cache();

        cache.store("k1", "SELECT 1", Duration::ZERO).unwrap();

        assert!(cache.contains("k1").unwrap());
        assert_eq!(cache.fetch("k1").unwrap().as_deref(), Some("SELECT 1"));
        assert_eq!(cache.purge_expired().unwrap(), 0);
        assert!(cache.contains("k1").unwrap());
    }

    #[test]
    fn test_delete_reports_only_live_entries() {
        let (_temp, cache) = create_test_cache();

        let past = Utc::now() - chrono::Duration::seconds(1);
        cache.store_with_expiry("old", "SELECT 1", past).unwrap();

        assert!(!cache.delete("old").unwrap());
        assert_eq!(cache.purge_expired().unwrap(), 0);
    }

    #[test]
    fn test_overwrite_and_delete() {
        let (_temp, cache) = create_test_cache();

        cache.store("k1", "SELECT 1", Duration::from_secs(60)).unwrap();
        cache.store("k1", "SELECT 2", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.fetch("k1").unwrap().as_deref(), Some("SELECT 2"));

        assert!(cache.delete("k1").unwrap());
        assert!(!cache.delete("k1").unwrap());
        assert!(!cache.contains("k1").unwrap());
    }

    #[test]
    fn test_purge_expired() {
        let (_temp, cache) = create_test_cache();

        let past = Utc::now() - chrono::Duration::hours(1);
        cache.store_with_expiry("old1", "SELECT 1", past).unwrap();
        cache.store_with_expiry("old2", "SELECT 2", past).unwrap();
        cache.store("new1", "SELECT 3", Duration::from_secs(3600)).unwrap();

        assert_eq!(cache.purge_expired().unwrap(), 2);
        assert!(cache.contains("new1").unwrap());
    }

    #[test]
    fn test_visible_to_second_handle() {
        let (temp, cache) = create_test_cache();
        cache.store("k1", "SELECT 1", Duration::from_secs(60)).unwrap();

        let other = SharedCache::open(temp.path().join("statements.sqlite")).unwrap();
        assert_eq!(other.fetch("k1").unwrap().as_deref(), Some("SELECT 1"));
        assert_eq!(other.path(), cache.path());
    }
}
