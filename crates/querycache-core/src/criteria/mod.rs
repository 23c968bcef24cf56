//! Structured query description.
//!
//! [`Criteria`] holds everything the SQL assembler needs: select columns, joins,
//! the filter tree, grouping, having, pagination and the cache key.

mod criterion;
mod join;
mod params;
mod value;

pub use criterion::{Comparison, Conjunction, Criterion};
pub use join::{Join, JoinCondition, JoinType};
pub use params::ParamCollector;
pub use value::SqlValue;

use crate::error::Result;
use crate::map::DatabaseMap;
use crate::statement::CacheKey;
use std::collections::HashMap;

/// A positional bind parameter: the value plus the column it is compared to.
#[derive(Debug, Clone, PartialEq)]
pub struct BindParam {
    pub table: String,
    pub column: String,
    pub value: SqlValue,
}

impl BindParam {
    pub fn new(table: impl Into<String>, column: impl Into<String>, value: SqlValue) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            value,
        }
    }
}

/// Modifiers placed between `SELECT` and the column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectModifier {
    Distinct,
}

/// A structured query against one database.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    db_name: String,
    primary_table: String,
    query_key: CacheKey,
    select_columns: Vec<String>,
    as_columns: Vec<(String, String)>,
    select_modifiers: Vec<SelectModifier>,
    aliases: HashMap<String, String>,
    joins: Vec<Join>,
    filters: Vec<Criterion>,
    having: Option<Criterion>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    sub_queries: Vec<(String, Criteria)>,
    limit: i64,
    offset: i64,
    ignore_case: bool,
    sub_criteria: bool,
}

impl Criteria {
    /// Query against `primary_table` in database `db_name`.
    pub fn new(db_name: impl Into<String>, primary_table: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            primary_table: primary_table.into(),
            query_key: CacheKey::none(),
            select_columns: Vec::new(),
            as_columns: Vec::new(),
            select_modifiers: Vec::new(),
            aliases: HashMap::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            having: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            sub_queries: Vec::new(),
            limit: -1,
            offset: 0,
            ignore_case: false,
            sub_criteria: false,
        }
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn primary_table(&self) -> &str {
        &self.primary_table
    }

    // Cache key

    pub fn set_query_key(&mut self, key: impl Into<CacheKey>) -> &mut Self {
        self.query_key = key.into();
        self
    }

    pub fn query_key(&self) -> &CacheKey {
        &self.query_key
    }

    // Select list

    pub fn add_select_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.select_columns.push(column.into());
        self
    }

    /// Select `expression AS alias`.
    pub fn add_as_column(&mut self, alias: impl Into<String>, expression: impl Into<String>) -> &mut Self {
        self.as_columns.push((alias.into(), expression.into()));
        self
    }

    /// Clear both plain and aliased select columns.
    pub fn clear_select_columns(&mut self) -> &mut Self {
        self.select_columns.clear();
        self.as_columns.clear();
        self
    }

    pub fn select_columns(&self) -> &[String] {
        &self.select_columns
    }

    pub fn as_columns(&self) -> &[(String, String)] {
        &self.as_columns
    }

    pub fn has_select_clause(&self) -> bool {
        !self.select_columns.is_empty() || !self.as_columns.is_empty()
    }

    /// Select every mapped column of the primary table.
    pub fn add_self_select_columns(&mut self, db_map: &DatabaseMap) -> Result<&mut Self> {
        let table = db_map.require_table(&self.primary_table)?;
        self.select_columns.extend(table.qualified_columns());
        Ok(self)
    }

    pub fn set_distinct(&mut self) -> &mut Self {
        if !self.is_distinct() {
            self.select_modifiers.push(SelectModifier::Distinct);
        }
        self
    }

    pub fn is_distinct(&self) -> bool {
        self.select_modifiers.contains(&SelectModifier::Distinct)
    }

    pub fn select_modifiers(&self) -> &[SelectModifier] {
        &self.select_modifiers
    }

    // Tables

    pub fn add_alias(&mut self, alias: impl Into<String>, table: impl Into<String>) -> &mut Self {
        self.aliases.insert(alias.into(), table.into());
        self
    }

    /// Real table behind `alias`, if `alias` is one.
    pub fn table_for_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn add_join(&mut self, join: Join) -> &mut Self {
        self.joins.push(join);
        self
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Add a derived table `(sub) alias` to the FROM clause.
    pub fn add_sub_query(&mut self, alias: impl Into<String>, mut sub: Criteria) -> &mut Self {
        sub.sub_criteria = true;
        self.sub_queries.push((alias.into(), sub));
        self
    }

    pub fn sub_queries(&self) -> &[(String, Criteria)] {
        &self.sub_queries
    }

    pub fn is_sub_criteria(&self) -> bool {
        self.sub_criteria
    }

    // Filtering and grouping

    pub fn add_filter(&mut self, criterion: Criterion) -> &mut Self {
        self.filters.push(criterion);
        self
    }

    pub fn filters(&self) -> &[Criterion] {
        &self.filters
    }

    pub fn set_having(&mut self, criterion: Criterion) -> &mut Self {
        self.having = Some(criterion);
        self
    }

    pub fn having(&self) -> Option<&Criterion> {
        self.having.as_ref()
    }

    pub fn add_group_by(&mut self, column: impl Into<String>) -> &mut Self {
        self.group_by.push(column.into());
        self
    }

    pub fn clear_group_by(&mut self) -> &mut Self {
        self.group_by.clear();
        self
    }

    pub fn group_by_columns(&self) -> &[String] {
        &self.group_by
    }

    /// Order by `expression`, e.g. `book.title DESC`.
    pub fn add_order_by(&mut self, expression: impl Into<String>) -> &mut Self {
        self.order_by.push(expression.into());
        self
    }

    pub fn order_by_columns(&self) -> &[String] {
        &self.order_by
    }

    pub fn set_ignore_case(&mut self, ignore_case: bool) -> &mut Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    // Pagination

    /// A negative limit means no limit.
    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn set_offset(&mut self, offset: i64) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Whether counting has to wrap the select in a derived table instead of
    /// replacing its column list with `COUNT(*)`.
    pub fn needs_complex_count(&self) -> bool {
        !self.group_by.is_empty()
            || self.offset != 0
            || self.limit >= 0
            || self.having.is_some()
            || self.is_distinct()
            || !self.sub_queries.is_empty()
    }
}
