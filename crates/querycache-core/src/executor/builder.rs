//! Builder for configuring a QueryExecutor.

use std::collections::HashMap;
use std::sync::Arc;

use super::QueryExecutor;
use crate::cache::{self, CacheBackend};
use crate::config::QueryCacheConfig;
use crate::error::Result;
use crate::map::DatabaseMap;
use crate::sql::{SqlAssembler, StandardAssembler};
use crate::statement::StatementCache;

/// Builder for configuring a [`QueryExecutor`].
///
/// # Example
///
/// ```rust,no_run
/// use querycache::config::{BackendKind, QueryCacheConfig};
/// use querycache::map::{ColumnType, DatabaseMap, TableMap};
/// use querycache::QueryExecutor;
///
/// let executor = QueryExecutor::builder(QueryCacheConfig::new(BackendKind::ProcessLocal))
///     .database(
///         DatabaseMap::new("bookstore")
///             .with_table(TableMap::new("book").with_column("id", ColumnType::Integer)),
///     )
///     .build()?;
/// # Ok::<(), querycache::QueryCacheError>(())
/// ```
pub struct QueryExecutorBuilder {
    config: QueryCacheConfig,
    assembler: Option<Arc<dyn SqlAssembler>>,
    custom_backend: Option<Arc<dyn CacheBackend>>,
    databases: HashMap<String, DatabaseMap>,
}

impl QueryExecutorBuilder {
    pub fn new(config: QueryCacheConfig) -> Self {
        Self {
            config,
            assembler: None,
            custom_backend: None,
            databases: HashMap::new(),
        }
    }

    /// SQL assembler used for fresh builds.
    ///
    /// Default: [`StandardAssembler`]
    pub fn assembler(mut self, assembler: Arc<dyn SqlAssembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }

    /// Register the map of a database queries may target.
    pub fn database(mut self, map: DatabaseMap) -> Self {
        self.databases.insert(map.name.clone(), map);
        self
    }

    /// Backend used when the configured kind is `custom`.
    ///
    /// Ignored for every other kind. Without it a `custom` configuration
    /// behaves like `disabled`.
    pub fn custom_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.custom_backend = Some(backend);
        self
    }

    /// Open the configured backend and assemble the executor.
    pub fn build(self) -> Result<QueryExecutor> {
        let backend = cache::open_backend(&self.config, self.custom_backend)?;

        Ok(QueryExecutor {
            cache: StatementCache::new(backend, self.config.ttl()),
            assembler: self
                .assembler
                .unwrap_or_else(|| Arc::new(StandardAssembler::new())),
            databases: self.databases,
        })
    }
}
