//! Pagination clause rendering and stripping.
//!
//! Cached templates are shape-level, pagination is per call: the clause is
//! removed before a template is stored and appended again on every execution.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// The trailing pagination clause (`LIMIT n`, `LIMIT o, n` or `LIMIT n OFFSET o`)
/// with its leading whitespace. Limits inside derived tables are part of the
/// statement shape and never match.
static LIMIT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+LIMIT\s+\d+(\s*,\s*\d+|\s+OFFSET\s+\d+)?\s*$").unwrap()
});

/// Render the pagination clause for `limit`/`offset`.
///
/// A negative limit means "no limit"; the offset is ignored without a limit.
///
/// # Examples
///
/// ```
/// use querycache::statement::limit_clause;
///
/// assert_eq!(limit_clause(10, 20), " LIMIT 20, 10");
/// assert_eq!(limit_clause(10, 0), " LIMIT 10");
/// assert_eq!(limit_clause(-1, 20), "");
/// ```
pub fn limit_clause(limit: i64, offset: i64) -> String {
    if limit > -1 {
        if offset > 0 {
            return format!(" LIMIT {}, {}", offset, limit);
        }
        return format!(" LIMIT {}", limit);
    }

    String::new()
}

/// Remove the trailing pagination clause from `sql`, if there is one.
pub fn strip_limit(sql: &str) -> Cow<'_, str> {
    LIMIT_CLAUSE.replace(sql, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_clause() {
        assert_eq!(limit_clause(10, 20), " LIMIT 20, 10");
        assert_eq!(limit_clause(10, 0), " LIMIT 10");
        assert_eq!(limit_clause(0, 0), " LIMIT 0");
        assert_eq!(limit_clause(-1, 0), "");
        assert_eq!(limit_clause(-1, 5), "");
    }

    #[test]
    fn test_strip_limit_roundtrips_template() {
        let template = "SELECT book.id FROM book WHERE book.author_id = :p1";
        for (limit, offset) in [(10, 0), (10, 20), (-1, 0)] {
            let sql = format!("{}{}", template, limit_clause(limit, offset));
            assert_eq!(strip_limit(&sql), template);
        }
    }

    #[test]
    fn test_strip_limit_is_case_insensitive() {
        assert_eq!(strip_limit("SELECT 1 limit 5"), "SELECT 1");
    }

    #[test]
    fn test_strip_limit_keeps_derived_table_limits() {
        let sql = "SELECT COUNT(*) FROM (SELECT book.id FROM book LIMIT 10) countmatch";
        assert_eq!(strip_limit(sql), sql);

        let sql = "SELECT b.id FROM (SELECT book.id FROM book LIMIT 2) b LIMIT 5, 10";
        assert_eq!(
            strip_limit(sql),
            "SELECT b.id FROM (SELECT book.id FROM book LIMIT 2) b"
        );
    }

    #[test]
    fn test_strip_limit_offset_form() {
        assert_eq!(strip_limit("SELECT 1 LIMIT 10 OFFSET 20"), "SELECT 1");
    }

    #[test]
    fn test_strip_limit_leaves_identifiers_alone() {
        let sql = "SELECT plan.limit_value FROM plan";
        assert_eq!(strip_limit(sql), sql);
    }
}
