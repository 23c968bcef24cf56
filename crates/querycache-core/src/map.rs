//! Database map: tables and column types known to the executor.

use crate::error::{QueryCacheError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    Blob,
}

impl ColumnType {
    pub fn is_text(&self) -> bool {
        matches!(self, ColumnType::Text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnMap {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn is_text(&self) -> bool {
        self.column_type.is_text()
    }
}

/// A mapped table with its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMap {
    pub name: String,
    pub columns: Vec<ColumnMap>,
}

impl TableMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnMap::new(name, column_type));
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMap> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Fully qualified names of every column, e.g. `book.title`.
    pub fn qualified_columns(&self) -> impl Iterator<Item = String> + '_ {
        self.columns
            .iter()
            .map(move |c| format!("{}.{}", self.name, c.name))
    }
}

/// All tables of one database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMap {
    pub name: String,
    tables: HashMap<String, TableMap>,
}

impl DatabaseMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: HashMap::new(),
        }
    }

    pub fn with_table(mut self, table: TableMap) -> Self {
        self.add_table(table);
        self
    }

    pub fn add_table(&mut self, table: TableMap) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn table(&self, name: &str) -> Option<&TableMap> {
        self.tables.get(name)
    }

    /// Like [`DatabaseMap::table`] but unknown tables are an error.
    pub fn require_table(&self, name: &str) -> Result<&TableMap> {
        self.table(name).ok_or_else(|| QueryCacheError::UnknownTable {
            table: name.to_string(),
        })
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnMap> {
        self.table(table).and_then(|t| t.column(column))
    }

    /// Unmapped columns are treated as non-text.
    pub fn is_text_column(&self, table: &str, column: &str) -> bool {
        self.column(table, column)
            .map(ColumnMap::is_text)
            .unwrap_or(false)
    }
}
