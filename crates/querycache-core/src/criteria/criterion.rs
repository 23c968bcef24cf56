//! Filter tree nodes.

use super::{BindParam, SqlValue};

/// Comparison operator of a filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    /// Raw SQL supplied by the caller; binds nothing.
    Custom,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "<>",
            Comparison::GreaterThan => ">",
            Comparison::GreaterEqual => ">=",
            Comparison::LessThan => "<",
            Comparison::LessEqual => "<=",
            Comparison::Like => " LIKE ",
            Comparison::NotLike => " NOT LIKE ",
            Comparison::In => " IN ",
            Comparison::NotIn => " NOT IN ",
            Comparison::IsNull => " IS NULL",
            Comparison::IsNotNull => " IS NOT NULL",
            Comparison::Custom => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Conjunction::And => " AND ",
            Conjunction::Or => " OR ",
        }
    }
}

/// One node of a filter tree, with any clauses attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    table: String,
    column: String,
    comparison: Comparison,
    values: Vec<SqlValue>,
    ignore_case: bool,
    clauses: Vec<(Conjunction, Criterion)>,
}

impl Criterion {
    /// `table.column <comparison> value`.
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
            values: vec![value.into()],
            ignore_case: false,
            clauses: Vec::new(),
        }
    }

    pub fn equal(table: impl Into<String>, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(table, column, Comparison::Equal, value)
    }

    pub fn in_list(
        table: impl Into<String>,
        column: impl Into<String>,
        values: impl IntoIterator<Item = SqlValue>,
    ) -> Self {
        Self::list(table, column, Comparison::In, values)
    }

    pub fn not_in_list(
        table: impl Into<String>,
        column: impl Into<String>,
        values: impl IntoIterator<Item = SqlValue>,
    ) -> Self {
        Self::list(table, column, Comparison::NotIn, values)
    }

    fn list(
        table: impl Into<String>,
        column: impl Into<String>,
        comparison: Comparison,
        values: impl IntoIterator<Item = SqlValue>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            comparison,
            values: values.into_iter().collect(),
            ignore_case: false,
            clauses: Vec::new(),
        }
    }

    pub fn is_null(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::list(table, column, Comparison::IsNull, [])
    }

    pub fn is_not_null(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::list(table, column, Comparison::IsNotNull, [])
    }

    /// Raw SQL condition, rendered verbatim.
    pub fn custom(sql: impl Into<String>) -> Self {
        Self::list(String::new(), sql, Comparison::Custom, [])
    }

    pub fn and(mut self, other: Criterion) -> Self {
        self.clauses.push((Conjunction::And, other));
        self
    }

    pub fn or(mut self, other: Criterion) -> Self {
        self.clauses.push((Conjunction::Or, other));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn set_ignore_case(&mut self, ignore_case: bool) -> &mut Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Visit this node and every attached clause, depth first.
    pub fn for_each_attached_mut(&mut self, f: &mut dyn FnMut(&mut Criterion)) {
        f(self);
        for (_, clause) in &mut self.clauses {
            clause.for_each_attached_mut(f);
        }
    }

    /// Number of parameters [`Criterion::append_ps_to`] will emit.
    pub fn param_count(&self) -> usize {
        let own = match self.comparison {
            Comparison::IsNull | Comparison::IsNotNull | Comparison::Custom => 0,
            Comparison::In | Comparison::NotIn => self.values.len(),
            _ => 1,
        };
        own + self
            .clauses
            .iter()
            .map(|(_, c)| c.param_count())
            .sum::<usize>()
    }

    /// Render this node as SQL into `sql`, pushing its bind values onto
    /// `params`. Placeholders are numbered by position in `params`.
    pub fn append_ps_to(&self, sql: &mut String, params: &mut Vec<BindParam>) {
        if !self.clauses.is_empty() {
            sql.push('(');
        }

        self.append_own_ps_to(sql, params);

        for (conjunction, clause) in &self.clauses {
            sql.push_str(conjunction.as_sql());
            clause.append_ps_to(sql, params);
        }

        if !self.clauses.is_empty() {
            sql.push(')');
        }
    }

    fn append_own_ps_to(&self, sql: &mut String, params: &mut Vec<BindParam>) {
        let column = if self.table.is_empty() {
            self.column.clone()
        } else {
            format!("{}.{}", self.table, self.column)
        };

        match self.comparison {
            Comparison::Custom => sql.push_str(&self.column),
            Comparison::IsNull | Comparison::IsNotNull => {
                sql.push_str(&column);
                sql.push_str(self.comparison.as_sql());
            }
            Comparison::In | Comparison::NotIn => {
                if self.values.is_empty() {
                    // Empty IN matches nothing, empty NOT IN matches everything
                    sql.push_str(if self.comparison == Comparison::In {
                        "1<>1"
                    } else {
                        "1=1"
                    });
                    return;
                }
                let placeholders: Vec<String> = self
                    .values
                    .iter()
                    .map(|value| self.push_param(params, value))
                    .collect();
                sql.push_str(&column);
                sql.push_str(self.comparison.as_sql());
                sql.push('(');
                sql.push_str(&placeholders.join(","));
                sql.push(')');
            }
            _ => {
                let value = self.values.first().cloned().unwrap_or(SqlValue::Null);
                let placeholder = self.push_param(params, &value);
                if self.ignore_case && value.is_text() {
                    sql.push_str(&format!(
                        "UPPER({}){}UPPER({})",
                        column,
                        self.comparison.as_sql(),
                        placeholder
                    ));
                } else {
                    sql.push_str(&column);
                    sql.push_str(self.comparison.as_sql());
                    sql.push_str(&placeholder);
                }
            }
        }
    }

    fn push_param(&self, params: &mut Vec<BindParam>, value: &SqlValue) -> String {
        params.push(BindParam::new(&self.table, &self.column, value.clone()));
        format!(":p{}", params.len())
    }
}
