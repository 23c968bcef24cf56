//! Query cache configuration.
//!
//! Two options are recognized by integrators: the backend and the entry
//! lifetime. The shared backend additionally accepts the path of its store.

use crate::error::{QueryCacheError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Storage used for cached statement templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Every cache operation fails until a real backend is configured.
    Disabled,
    /// Store shared by every process on the host, entries expire after `lifetime`.
    #[default]
    #[serde(alias = "sharedMemory", alias = "apc", alias = "apcu")]
    SharedMemory,
    /// In-memory store owned by the current process, no expiry.
    #[serde(alias = "processLocal", alias = "array")]
    ProcessLocal,
    /// Integrator-supplied implementation.
    Custom,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Disabled => "disabled",
            BackendKind::SharedMemory => "shared_memory",
            BackendKind::ProcessLocal => "process_local",
            BackendKind::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "disabled" => Some(BackendKind::Disabled),
            "shared_memory" | "sharedmemory" | "apc" | "apcu" => Some(BackendKind::SharedMemory),
            "process_local" | "processlocal" | "array" => Some(BackendKind::ProcessLocal),
            "custom" => Some(BackendKind::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the statement cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct QueryCacheConfig {
    /// Which backend stores statement templates.
    pub backend: BackendKind,
    /// Entry lifetime in seconds (shared backend only). `0` keeps entries until
    /// they are deleted.
    pub lifetime: u64,
    /// Location of the shared store. `None` uses [`QueryCacheConfig::default_shared_path`].
    pub shared_path: Option<PathBuf>,
}

impl QueryCacheConfig {
    /// Default entry lifetime (1 hour).
    pub const DEFAULT_LIFETIME_SECS: u64 = 3600;
    pub const SHARED_DIR_NAME: &'static str = "querycache";
    pub const SHARED_FILE_NAME: &'static str = "statements.sqlite";

    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn with_lifetime(mut self, secs: u64) -> Self {
        self.lifetime = secs;
        self
    }

    pub fn with_shared_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.shared_path = Some(path.into());
        self
    }

    /// Entry lifetime as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.lifetime)
    }

    /// Path every process on the host agrees on when none is configured.
    pub fn default_shared_path() -> PathBuf {
        std::env::temp_dir()
            .join(Self::SHARED_DIR_NAME)
            .join(Self::SHARED_FILE_NAME)
    }

    pub fn resolved_shared_path(&self) -> PathBuf {
        self.shared_path
            .clone()
            .unwrap_or_else(Self::default_shared_path)
    }

    /// Build a configuration from `name => value` parameter pairs.
    ///
    /// Recognized names are `backend`, `lifetime` and `shared_path`. Unknown
    /// names are rejected so that typos don't silently fall back to defaults.
    pub fn from_parameters<'a, I>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();

        for (name, value) in params {
            match name {
                "backend" => {
                    config.backend =
                        BackendKind::from_str(value.trim()).ok_or_else(|| {
                            QueryCacheError::config(format!(
                                "Unknown query cache backend '{}' (expected disabled, shared_memory, process_local or custom)",
                                value
                            ))
                        })?;
                }
                "lifetime" => {
                    config.lifetime =
                        value
                            .trim()
                            .parse()
                            .map_err(|_| QueryCacheError::Validation {
                                field: "lifetime".into(),
                                message: format!("expected a number of seconds, got '{}'", value),
                            })?;
                }
                "shared_path" => {
                    config.shared_path = Some(PathBuf::from(value));
                }
                other => {
                    return Err(QueryCacheError::config(format!(
                        "Unknown query cache parameter '{}'",
                        other
                    )));
                }
            }
        }

        Ok(config)
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            lifetime: Self::DEFAULT_LIFETIME_SECS,
            shared_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueryCacheConfig::default();
        assert_eq!(config.backend, BackendKind::SharedMemory);
        assert_eq!(config.ttl(), Duration::from_secs(3600));
        assert!(config
            .resolved_shared_path()
            .ends_with("querycache/statements.sqlite"));
    }

    #[test]
    fn test_backend_kind_roundtrip() {
        for kind in [
            BackendKind::Disabled,
            BackendKind::SharedMemory,
            BackendKind::ProcessLocal,
            BackendKind::Custom,
        ] {
            assert_eq!(BackendKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(BackendKind::from_str("apc"), Some(BackendKind::SharedMemory));
        assert_eq!(BackendKind::from_str("array"), Some(BackendKind::ProcessLocal));
        assert_eq!(BackendKind::from_str("memcache"), None);
    }

    #[test]
    fn test_from_parameters() {
        let config =
            QueryCacheConfig::from_parameters([("backend", "array"), ("lifetime", "60")]).unwrap();
        assert_eq!(config.backend, BackendKind::ProcessLocal);
        assert_eq!(config.lifetime, 60);
    }

    #[test]
    fn test_from_parameters_rejects_bad_input() {
        let err = QueryCacheConfig::from_parameters([("backend", "redis")]).unwrap_err();
        assert!(err.is_configuration_error());

        let err = QueryCacheConfig::from_parameters([("lifetime", "soon")]).unwrap_err();
        assert!(matches!(err, QueryCacheError::Validation { .. }));

        let err = QueryCacheConfig::from_parameters([("lifetimes", "10")]).unwrap_err();
        assert!(matches!(err, QueryCacheError::Config { .. }));
    }

    #[test]
    fn test_from_json() {
        let config = QueryCacheConfig::from_json(r#"{"backend": "apcu"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::SharedMemory);
        assert_eq!(config.lifetime, QueryCacheConfig::DEFAULT_LIFETIME_SECS);

        let config =
            QueryCacheConfig::from_json(r#"{"backend": "process_local", "lifetime": 5}"#).unwrap();
        assert_eq!(config.backend, BackendKind::ProcessLocal);
        assert_eq!(config.lifetime, 5);

        let config = QueryCacheConfig::from_json(r#"{"backend": "sharedMemory"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::SharedMemory);

        let config = QueryCacheConfig::from_json(r#"{"backend": "processLocal"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::ProcessLocal);
    }
}
