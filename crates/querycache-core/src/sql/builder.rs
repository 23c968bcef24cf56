//! Stock SELECT builder.

use super::SqlAssembler;
use crate::criteria::{BindParam, Criteria};
use crate::error::{QueryCacheError, Result};
use crate::statement::limit_clause;

/// Renders `SELECT [DISTINCT] ... FROM ... [JOIN ...] [WHERE ...] [GROUP BY ...]
/// [HAVING ...] [ORDER BY ...] [LIMIT ...]` with `:pN` placeholders.
///
/// Parameters are numbered in the order derived tables, join conditions,
/// filters and having appear, which matches the collector for queries without
/// sub-queries.
#[derive(Debug, Clone, Default)]
pub struct StandardAssembler;

impl StandardAssembler {
    pub fn new() -> Self {
        Self
    }

    fn select_list(criteria: &Criteria) -> Result<String> {
        let columns: Vec<String> = criteria
            .select_columns()
            .iter()
            .cloned()
            .chain(
                criteria
                    .as_columns()
                    .iter()
                    .map(|(alias, expression)| format!("{} AS {}", expression, alias)),
            )
            .collect();

        if columns.is_empty() {
            return Err(QueryCacheError::Validation {
                field: "select_columns".into(),
                message: format!(
                    "query on '{}' has nothing to select",
                    criteria.primary_table()
                ),
            });
        }

        Ok(columns.join(", "))
    }
}

impl SqlAssembler for StandardAssembler {
    fn build_select(&self, criteria: &Criteria, params: &mut Vec<BindParam>) -> Result<String> {
        let mut sql = String::from("SELECT ");
        if criteria.is_distinct() {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&Self::select_list(criteria)?);

        let mut from = Vec::new();
        if !criteria.primary_table().is_empty() {
            from.push(criteria.primary_table().to_string());
        }
        for (alias, sub) in criteria.sub_queries() {
            let sub_sql = self.build_select(sub, params)?;
            from.push(format!("({}) {}", sub_sql, alias));
        }
        sql.push_str(" FROM ");
        sql.push_str(&from.join(", "));

        for join in criteria.joins() {
            join.append_ps_to(&mut sql, params);
        }

        if !criteria.filters().is_empty() {
            sql.push_str(" WHERE ");
            for (i, filter) in criteria.filters().iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                filter.append_ps_to(&mut sql, params);
            }
        }

        if !criteria.group_by_columns().is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&criteria.group_by_columns().join(","));
        }

        if let Some(having) = criteria.having() {
            sql.push_str(" HAVING ");
            having.append_ps_to(&mut sql, params);
        }

        if !criteria.order_by_columns().is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&criteria.order_by_columns().join(","));
        }

        sql.push_str(&limit_clause(criteria.limit(), criteria.offset()));

        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Comparison, Criterion, Join, JoinCondition, ParamCollector, SqlValue};
    use crate::map::{ColumnType, DatabaseMap, TableMap};
    use crate::statement::count_placeholders;

    #[test]
    fn test_full_select() {
        let mut c = Criteria::new("bookstore", "book");
        c.add_select_column("book.id")
            .add_as_column("n", "COUNT(book.id)")
            .set_distinct()
            .add_join(
                Join::inner("book", "author_id", "author", "id").with_condition(JoinCondition::new(
                    "author",
                    "active",
                    Comparison::Equal,
                    true,
                )),
            )
            .add_filter(Criterion::new("book", "price", Comparison::LessThan, 20))
            .add_group_by("book.author_id")
            .set_having(Criterion::new("", "COUNT(book.id)", Comparison::GreaterThan, 1))
            .add_order_by("book.id DESC")
            .set_limit(10)
            .set_offset(20);

        let mut params = Vec::new();
        let sql = StandardAssembler::new().build_select(&c, &mut params).unwrap();

        assert_eq!(
            sql,
            "SELECT DISTINCT book.id, COUNT(book.id) AS n FROM book \
             INNER JOIN author ON (book.author_id=author.id AND author.active=:p1) \
             WHERE book.price<:p2 GROUP BY book.author_id HAVING COUNT(book.id)>:p3 \
             ORDER BY book.id DESC LIMIT 20, 10"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_placeholders_match_collected_params() {
        let map = DatabaseMap::new("bookstore").with_table(
            TableMap::new("book")
                .with_column("id", ColumnType::Integer)
                .with_column("title", ColumnType::Text),
        );
        let mut c = Criteria::new("bookstore", "book");
        c.add_select_column("book.id")
            .add_filter(Criterion::equal("book", "title", "Dune").or(Criterion::in_list(
                "book",
                "id",
                vec![SqlValue::from(1), SqlValue::from(2), SqlValue::from(3)],
            )))
            .add_filter(Criterion::is_null("book", "title"));

        let collected = ParamCollector::new(&map).collect(&mut c);
        let mut params = Vec::new();
        let sql = StandardAssembler::new().build_select(&c, &mut params).unwrap();

        assert_eq!(count_placeholders(&sql), collected.len());
        assert_eq!(params, collected);
    }

    #[test]
    fn test_sub_query_in_from() {
        let mut inner = Criteria::new("bookstore", "book");
        inner.add_select_column("book.author_id");

        let mut outer = Criteria::new("bookstore", "");
        outer.add_select_column("b.author_id").add_sub_query("b", inner);

        let mut params = Vec::new();
        let sql = StandardAssembler::new().build_select(&outer, &mut params).unwrap();
        assert_eq!(
            sql,
            "SELECT b.author_id FROM (SELECT book.author_id FROM book) b"
        );
    }

    #[test]
    fn test_empty_select_list_is_rejected() {
        let c = Criteria::new("bookstore", "book");
        let err = StandardAssembler::new()
            .build_select(&c, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, QueryCacheError::Validation { .. }));
    }
}
