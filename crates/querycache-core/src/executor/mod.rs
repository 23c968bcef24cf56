//! Query execution with statement caching.
//!
//! Each execution follows the same path:
//!
//! - no cache key: build the SQL, execute
//! - cached template with the expected placeholder count: reuse it, execute
//! - stale template: drop it, build, execute, store
//! - nothing cached: build, execute, store
//!
//! The select path caches templates without their pagination clause so pages
//! of the same query share one entry.

mod builder;

pub use builder::QueryExecutorBuilder;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::adapter::Connection;
use crate::config::QueryCacheConfig;
use crate::criteria::{BindParam, Criteria, ParamCollector};
use crate::error::{QueryCacheError, Result, StatementKind};
use crate::map::DatabaseMap;
use crate::sql::SqlAssembler;
use crate::statement::{limit_clause, strip_limit, CacheKey, CacheLookup, StatementCache};

/// Alias of the derived table wrapped by complex counts.
const COUNT_ALIAS: &str = "countmatch";

/// Statement ready for execution.
struct Prepared {
    sql: String,
    params: Vec<BindParam>,
    reused: bool,
}

/// Runs [`Criteria`] queries, reusing cached SQL for keyed queries.
pub struct QueryExecutor {
    cache: StatementCache,
    assembler: Arc<dyn SqlAssembler>,
    databases: HashMap<String, DatabaseMap>,
}

impl QueryExecutor {
    pub fn builder(config: QueryCacheConfig) -> QueryExecutorBuilder {
        QueryExecutorBuilder::new(config)
    }

    /// Statement cache, e.g. for manual invalidation.
    pub fn cache(&self) -> &StatementCache {
        &self.cache
    }

    pub fn database_map(&self, name: &str) -> Result<&DatabaseMap> {
        self.databases
            .get(name)
            .ok_or_else(|| QueryCacheError::UnknownDatabase {
                name: name.to_string(),
            })
    }

    /// Execute the row-selecting statement for `criteria`.
    ///
    /// Without explicit select columns every column of the primary table is
    /// selected; `criteria` keeps those columns afterwards.
    pub fn select<C: Connection>(&self, criteria: &mut Criteria, conn: &C) -> Result<C::Rows> {
        let db_map = self.database_map(criteria.db_name())?;
        self.prepare_select_columns(criteria, db_map)?;

        let key = criteria.query_key().clone();
        let prepared = match self.lookup(&key, criteria, db_map)? {
            Some((template, params)) => Prepared {
                sql: format!(
                    "{}{}",
                    template,
                    limit_clause(criteria.limit(), criteria.offset())
                ),
                params,
                reused: true,
            },
            None => {
                ParamCollector::new(db_map).apply_case_folding(criteria);
                let mut params = Vec::new();
                let sql = self.assembler.build_select(criteria, &mut params)?;
                Prepared {
                    sql,
                    params,
                    reused: false,
                }
            }
        };

        let rows = self.run(StatementKind::Select, conn, &prepared, db_map)?;

        if !prepared.reused {
            self.remember(&key, &strip_limit(&prepared.sql))?;
        }

        Ok(rows)
    }

    /// Execute the row-counting statement for `criteria`.
    ///
    /// Works on a copy: the caller's select list is left untouched.
    pub fn count<C: Connection>(&self, criteria: &Criteria, conn: &C) -> Result<C::Rows> {
        let mut criteria = criteria.clone();
        let db_map = self.database_map(criteria.db_name())?;

        let key = criteria.query_key().clone();
        let prepared = match self.lookup(&key, &mut criteria, db_map)? {
            Some((sql, params)) => Prepared {
                sql,
                params,
                reused: true,
            },
            None => {
                let mut params = Vec::new();
                let sql = self.build_count(&mut criteria, db_map, &mut params)?;
                Prepared {
                    sql,
                    params,
                    reused: false,
                }
            }
        };

        let rows = self.run(StatementKind::Count, conn, &prepared, db_map)?;

        if !prepared.reused {
            self.remember(&key, &prepared.sql)?;
        }

        Ok(rows)
    }

    fn prepare_select_columns(&self, criteria: &mut Criteria, db_map: &DatabaseMap) -> Result<()> {
        if !criteria.has_select_clause() && !criteria.is_sub_criteria() {
            criteria.add_self_select_columns(db_map)?;
        }
        self.assembler.configure_select_columns(criteria);
        Ok(())
    }

    /// Cached template for `key` plus freshly collected parameters, or `None`
    /// when the statement has to be built.
    fn lookup(
        &self,
        key: &CacheKey,
        criteria: &mut Criteria,
        db_map: &DatabaseMap,
    ) -> Result<Option<(String, Vec<BindParam>)>> {
        if !key.is_enabled() {
            debug!("No cache key on query against {}", criteria.primary_table());
            return Ok(None);
        }

        let params = ParamCollector::new(db_map).collect(criteria);
        match self.cache.fetch_validated(key, params.len())? {
            CacheLookup::Hit(sql) => {
                debug!("Reusing cached statement for key {}", key);
                Ok(Some((sql, params)))
            }
            CacheLookup::Stale { cached, expected } => {
                debug!(
                    "Dropped stale statement for key {} ({} placeholders, {} parameters)",
                    key, cached, expected
                );
                Ok(None)
            }
            CacheLookup::Miss | CacheLookup::Disabled => {
                debug!("No cached statement for key {}", key);
                Ok(None)
            }
        }
    }

    fn build_count(
        &self,
        criteria: &mut Criteria,
        db_map: &DatabaseMap,
        params: &mut Vec<BindParam>,
    ) -> Result<String> {
        self.prepare_select_columns(criteria, db_map)?;
        ParamCollector::new(db_map).apply_case_folding(criteria);

        if criteria.needs_complex_count() {
            if self.assembler.needs_select_aliases(criteria) {
                if criteria.having().is_some() {
                    return Err(QueryCacheError::AliasingConflict);
                }
                self.assembler.turn_select_columns_to_aliases(criteria);
            }
            let select = self.assembler.build_select(criteria, params)?;
            debug!("Counting {} through a derived table", criteria.primary_table());
            Ok(format!("SELECT COUNT(*) FROM ({}) {}", select, COUNT_ALIAS))
        } else {
            criteria.clear_select_columns().add_select_column("COUNT(*)");
            self.assembler.build_select(criteria, params)
        }
    }

    fn run<C: Connection>(
        &self,
        kind: StatementKind,
        conn: &C,
        prepared: &Prepared,
        db_map: &DatabaseMap,
    ) -> Result<C::Rows> {
        conn.execute(&prepared.sql, &prepared.params, db_map)
            .map_err(|e| {
                error!("Unable to execute {} statement [{}]: {}", kind, prepared.sql, e);
                QueryCacheError::StatementExecution {
                    kind,
                    sql: prepared.sql.clone(),
                    source: Box::new(e),
                }
            })
    }

    fn remember(&self, key: &CacheKey, sql: &str) -> Result<()> {
        if !key.is_enabled() {
            return Ok(());
        }
        self.cache.store(key, sql)?;
        debug!("Stored statement for key {}", key);
        Ok(())
    }
}
