//! Backend that refuses every operation.

use super::traits::CacheBackend;
use crate::error::{QueryCacheError, Result};
use std::time::Duration;

const NOT_CONFIGURED: &str = "The query cache is disabled: configure the shared_memory, process_local or custom backend to enable it";
const MISSING_OVERRIDE: &str = "The custom query cache backend was selected but no implementation was supplied: pass one with custom_backend() to enable the query cache";

/// Placeholder backend for an unconfigured cache.
///
/// Every call fails with a configuration error so that a missing setup is
/// noticed instead of silently running uncached.
#[derive(Debug, Clone)]
pub struct DisabledCache {
    message: &'static str,
}

impl DisabledCache {
    pub fn new() -> Self {
        Self {
            message: NOT_CONFIGURED,
        }
    }

    /// Fallback for the custom variant when no override was provided.
    pub fn missing_override() -> Self {
        Self {
            message: MISSING_OVERRIDE,
        }
    }

    fn refuse<T>(&self) -> Result<T> {
        Err(QueryCacheError::config(self.message))
    }
}

impl Default for DisabledCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for DisabledCache {
    fn fetch(&self, _key: &str) -> Result<Option<String>> {
        self.refuse()
    }

    fn store(&self, _key: &str, _sql: &str, _ttl: Duration) -> Result<()> {
        self.refuse()
    }

    fn contains(&self, _key: &str) -> Result<bool> {
        self.refuse()
    }

    fn delete(&self, _key: &str) -> Result<bool> {
        self.refuse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_operation_fails() {
        let cache = DisabledCache::new();

        assert!(cache.fetch("k").unwrap_err().is_configuration_error());
        assert!(cache
            .store("k", "SELECT 1", Duration::from_secs(1))
            .unwrap_err()
            .is_configuration_error());
        assert!(cache.contains("k").unwrap_err().is_configuration_error());
        assert!(cache.delete("k").unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_message_names_alternatives() {
        let message = DisabledCache::new().contains("k").unwrap_err().to_string();
        assert!(message.contains("shared_memory"));
        assert!(message.contains("process_local"));
        assert!(message.contains("custom"));
    }
}
