//! Storage backends for cached statement templates.
//!
//! A backend is chosen once from [`QueryCacheConfig`] and then used through the
//! [`CacheBackend`] trait; the executor never re-checks which variant it holds.

mod disabled;
mod memory;
mod sqlite;
mod traits;

pub use disabled::DisabledCache;
pub use memory::ProcessLocalCache;
pub use sqlite::SharedCache;
pub use traits::CacheBackend;

use crate::config::{BackendKind, QueryCacheConfig};
use crate::error::Result;
use std::sync::Arc;

/// Instantiate the backend selected by `config`.
///
/// `custom` is only consulted for [`BackendKind::Custom`]. Without it the
/// custom variant behaves like the disabled one.
pub fn open_backend(
    config: &QueryCacheConfig,
    custom: Option<Arc<dyn CacheBackend>>,
) -> Result<Arc<dyn CacheBackend>> {
    let backend: Arc<dyn CacheBackend> = match config.backend {
        BackendKind::Disabled => Arc::new(DisabledCache::new()),
        BackendKind::SharedMemory => {
            Arc::new(SharedCache::open(config.resolved_shared_path())?)
        }
        BackendKind::ProcessLocal => ProcessLocalCache::global(),
        BackendKind::Custom => match custom {
            Some(backend) => backend,
            None => Arc::new(DisabledCache::missing_override()),
        },
    };

    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryCacheError;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_disabled_backend_is_loud() {
        let backend = open_backend(&QueryCacheConfig::new(BackendKind::Disabled), None).unwrap();
        let err = backend.contains("k1").unwrap_err();
        assert!(matches!(err, QueryCacheError::Config { .. }));
    }

    #[test]
    fn test_custom_without_override_is_disabled() {
        let backend = open_backend(&QueryCacheConfig::new(BackendKind::Custom), None).unwrap();
        let err = backend
            .store("k1", "SELECT 1", Duration::from_secs(1))
            .unwrap_err();
        assert!(err.to_string().contains("custom"));
    }

    #[test]
    fn test_custom_override_is_used() {
        let custom: Arc<dyn CacheBackend> = Arc::new(ProcessLocalCache::new());
        custom
            .store("k1", "SELECT 1", Duration::from_secs(1))
            .unwrap();

        let backend = open_backend(
            &QueryCacheConfig::new(BackendKind::Custom),
            Some(custom.clone()),
        )
        .unwrap();
        assert!(backend.contains("k1").unwrap());
    }

    #[test]
    fn test_process_local_is_process_wide() {
        let config = QueryCacheConfig::new(BackendKind::ProcessLocal);
        let first = open_backend(&config, None).unwrap();
        let second = open_backend(&config, None).unwrap();

        first
            .store("cache-mod-process-wide", "SELECT 1", Duration::ZERO)
            .unwrap();
        assert!(second.contains("cache-mod-process-wide").unwrap());
        assert!(second.delete("cache-mod-process-wide").unwrap());
    }

    #[test]
    fn test_shared_backend_opens_configured_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("shared.sqlite");
        let config = QueryCacheConfig::new(BackendKind::SharedMemory).with_shared_path(&path);

        let backend = open_backend(&config, None).unwrap();
        backend
            .store("k1", "SELECT 1", Duration::from_secs(60))
            .unwrap();
        assert!(path.exists());
    }
}
