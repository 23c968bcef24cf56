//! Joins between the primary table and related tables.

use super::{BindParam, Comparison, SqlValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

/// Extra value condition in a join's `ON` clause, e.g. `author.active = :p1`.
///
/// Always binds exactly one value, so only binary comparisons make sense here.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub table: String,
    pub column: String,
    pub comparison: Comparison,
    pub value: SqlValue,
}

impl JoinCondition {
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<SqlValue>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            comparison,
            value: value.into(),
        }
    }

    pub fn to_param(&self) -> BindParam {
        BindParam::new(&self.table, &self.column, self.value.clone())
    }
}

/// `left_table.left_column = right_table.right_column` plus value conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    join_type: JoinType,
    left: (String, String),
    right_table: String,
    right_alias: Option<String>,
    right_column: String,
    conditions: Vec<JoinCondition>,
}

impl Join {
    pub fn new(
        join_type: JoinType,
        left_table: impl Into<String>,
        left_column: impl Into<String>,
        right_table: impl Into<String>,
        right_column: impl Into<String>,
    ) -> Self {
        Self {
            join_type,
            left: (left_table.into(), left_column.into()),
            right_table: right_table.into(),
            right_alias: None,
            right_column: right_column.into(),
            conditions: Vec::new(),
        }
    }

    pub fn inner(
        left_table: impl Into<String>,
        left_column: impl Into<String>,
        right_table: impl Into<String>,
        right_column: impl Into<String>,
    ) -> Self {
        Self::new(JoinType::Inner, left_table, left_column, right_table, right_column)
    }

    pub fn left(
        left_table: impl Into<String>,
        left_column: impl Into<String>,
        right_table: impl Into<String>,
        right_column: impl Into<String>,
    ) -> Self {
        Self::new(JoinType::Left, left_table, left_column, right_table, right_column)
    }

    /// Join the right table under `alias`; the right column is then qualified
    /// with the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.right_alias = Some(alias.into());
        self
    }

    pub fn with_condition(mut self, condition: JoinCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn right_table(&self) -> &str {
        &self.right_table
    }

    pub fn right_alias(&self) -> Option<&str> {
        self.right_alias.as_deref()
    }

    pub fn conditions(&self) -> &[JoinCondition] {
        &self.conditions
    }

    /// Render `<JOIN TYPE> right [alias] ON (...)`, pushing condition values
    /// onto `params`.
    pub fn append_ps_to(&self, sql: &mut String, params: &mut Vec<BindParam>) {
        let right_name = self.right_alias.as_deref().unwrap_or(&self.right_table);

        sql.push(' ');
        sql.push_str(self.join_type.as_sql());
        sql.push(' ');
        sql.push_str(&self.right_table);
        if let Some(alias) = &self.right_alias {
            sql.push(' ');
            sql.push_str(alias);
        }
        sql.push_str(&format!(
            " ON ({}.{}={}.{}",
            self.left.0, self.left.1, right_name, self.right_column
        ));

        for condition in &self.conditions {
            params.push(condition.to_param());
            sql.push_str(&format!(
                " AND {}.{}{}:p{}",
                condition.table,
                condition.column,
                condition.comparison.as_sql(),
                params.len()
            ));
        }

        sql.push(')');
    }
}
