//! Bind values.

use crate::map::ColumnType;
use std::fmt;

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_text(&self) -> bool {
        matches!(self, SqlValue::Text(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            SqlValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Convert to the storage type of the column the value is bound against.
    ///
    /// Values that have no sensible conversion are returned unchanged.
    pub fn coerce(&self, column_type: ColumnType) -> SqlValue {
        match (column_type, self) {
            (_, SqlValue::Null) => SqlValue::Null,
            (ColumnType::Text, SqlValue::Integer(i)) => SqlValue::Text(i.to_string()),
            (ColumnType::Text, SqlValue::Real(r)) => SqlValue::Text(r.to_string()),
            (ColumnType::Integer, SqlValue::Bool(b)) => SqlValue::Integer(i64::from(*b)),
            (ColumnType::Integer, SqlValue::Text(s)) => s
                .trim()
                .parse()
                .map(SqlValue::Integer)
                .unwrap_or_else(|_| self.clone()),
            (ColumnType::Real, SqlValue::Integer(i)) => SqlValue::Real(*i as f64),
            (ColumnType::Boolean, SqlValue::Integer(i)) => SqlValue::Bool(*i != 0),
            (ColumnType::Boolean, SqlValue::Text(s)) => match s.to_lowercase().as_str() {
                "1" | "true" | "yes" => SqlValue::Bool(true),
                "0" | "false" | "no" => SqlValue::Bool(false),
                _ => self.clone(),
            },
            _ => self.clone(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", r),
            SqlValue::Text(s) => write!(f, "'{}'", s),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Blob(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_to_column_type() {
        assert_eq!(
            SqlValue::from(42).coerce(ColumnType::Text),
            SqlValue::Text("42".into())
        );
        assert_eq!(
            SqlValue::from("7").coerce(ColumnType::Integer),
            SqlValue::Integer(7)
        );
        assert_eq!(
            SqlValue::from(true).coerce(ColumnType::Integer),
            SqlValue::Integer(1)
        );
        assert_eq!(
            SqlValue::from("abc").coerce(ColumnType::Integer),
            SqlValue::Text("abc".into())
        );
        assert_eq!(SqlValue::Null.coerce(ColumnType::Text), SqlValue::Null);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
    }
}
