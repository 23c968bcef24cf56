//! SQLite connection adapter.

use super::Connection;
use crate::criteria::{BindParam, SqlValue};
use crate::error::{QueryCacheError, Result};
use crate::map::DatabaseMap;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use std::path::Path;

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::from(*i),
            SqlValue::Real(r) => ToSqlOutput::from(*r),
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
            SqlValue::Bool(b) => ToSqlOutput::from(*b),
            SqlValue::Blob(b) => ToSqlOutput::from(b.as_slice()),
        })
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(r) => SqlValue::Real(r),
            ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
        }
    }
}

/// Fully fetched result of a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl RowSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `row`.
    pub fn get(&self, row: usize, column: &str) -> Option<&SqlValue> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// First column of the first row as an integer, as returned by `COUNT(*)`.
    pub fn count_value(&self) -> Option<i64> {
        self.rows.first()?.first()?.as_i64()
    }

    pub fn into_rows(self) -> Vec<Vec<SqlValue>> {
        self.rows
    }
}

/// [`Connection`] over a rusqlite database.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = rusqlite::Connection::open(path).map_err(|e| QueryCacheError::Database {
            message: format!("Failed to open database {}: {}", path.display(), e),
            source: Some(e),
        })?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: rusqlite::Connection::open_in_memory()?,
        })
    }

    /// Run a batch of statements without parameters, e.g. schema setup.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Bind value for `param`, converted to the type of its mapped column.
    fn bind_value(param: &BindParam, db_map: &DatabaseMap) -> SqlValue {
        match db_map.column(&param.table, &param.column) {
            Some(column) => param.value.coerce(column.column_type),
            None => param.value.clone(),
        }
    }
}

impl Connection for SqliteConnection {
    type Rows = RowSet;
    type Error = rusqlite::Error;

    fn execute(
        &self,
        sql: &str,
        params: &[BindParam],
        db_map: &DatabaseMap,
    ) -> rusqlite::Result<RowSet> {
        let mut stmt = self.conn.prepare(sql)?;

        for (i, param) in params.iter().enumerate() {
            let name = format!(":p{}", i + 1);
            let index = stmt
                .parameter_index(&name)?
                .ok_or(rusqlite::Error::InvalidParameterName(name))?;
            stmt.raw_bind_parameter(index, Self::bind_value(param, db_map))?;
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.raw_query();
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(SqlValue::from(row.get_ref(index)?));
            }
            rows.push(values);
        }

        Ok(RowSet { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{ColumnType, TableMap};

    fn create_test_db() -> (SqliteConnection, DatabaseMap) {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE book (id INTEGER PRIMARY KEY, title TEXT NOT NULL);
            INSERT INTO book (id, title) VALUES (1, 'Dune'), (2, 'Emma'), (3, '1984');
            "#,
        )
        .unwrap();
        let map = DatabaseMap::new("bookstore").with_table(
            TableMap::new("book")
                .with_column("id", ColumnType::Integer)
                .with_column("title", ColumnType::Text),
        );
        (conn, map)
    }

    #[test]
    fn test_execute_binds_positionally() {
        let (conn, map) = create_test_db();
        let params = vec![
            BindParam::new("book", "id", SqlValue::Integer(1)),
            BindParam::new("book", "title", SqlValue::Text("Emma".into())),
        ];

        let rows = conn
            .execute(
                "SELECT book.id, book.title FROM book WHERE book.id>:p1 AND book.title=:p2",
                &params,
                &map,
            )
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.columns(), ["id", "title"]);
        assert_eq!(rows.get(0, "id"), Some(&SqlValue::Integer(2)));
    }

    #[test]
    fn test_values_are_coerced_to_column_type() {
        let (conn, map) = create_test_db();
        // 1984 is stored as text, the integer must be bound as '1984'
        let params = vec![BindParam::new("book", "title", SqlValue::Integer(1984))];

        let rows = conn
            .execute("SELECT COUNT(*) FROM book WHERE book.title=:p1", &params, &map)
            .unwrap();
        assert_eq!(rows.count_value(), Some(1));
    }

    #[test]
    fn test_unknown_placeholder_is_an_error() {
        let (conn, map) = create_test_db();
        let params = vec![BindParam::new("book", "id", SqlValue::Integer(1))];

        let result = conn.execute("SELECT * FROM book WHERE id = :id", &params, &map);
        assert!(matches!(result, Err(rusqlite::Error::InvalidParameterName(_))));
    }

    #[test]
    fn test_bad_sql_is_an_error() {
        let (conn, map) = create_test_db();
        assert!(conn.execute("SELECT * FROM missing", &[], &map).is_err());
    }
}
