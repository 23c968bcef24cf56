//! SQL text assembly.
//!
//! The executor only needs an assembler for fresh builds; cache hits skip it
//! entirely. [`StandardAssembler`] is the stock implementation.

mod builder;

pub use builder::StandardAssembler;

use crate::criteria::{BindParam, Criteria};
use crate::error::Result;
use std::collections::HashSet;

/// Turns a [`Criteria`] into SQL text plus ordered bind parameters.
pub trait SqlAssembler: Send + Sync {
    /// Build the full SELECT statement, pagination clause included, pushing
    /// the bind values in placeholder order onto `params`.
    fn build_select(&self, criteria: &Criteria, params: &mut Vec<BindParam>) -> Result<String>;

    /// Finalize the select list before building. Default: nothing to do.
    fn configure_select_columns(&self, _criteria: &mut Criteria) {}

    /// Whether two select columns would share a name inside a derived table.
    fn needs_select_aliases(&self, criteria: &Criteria) -> bool {
        let mut seen = HashSet::new();
        criteria
            .select_columns()
            .iter()
            .map(|column| column_name(column).to_lowercase())
            .any(|name| !seen.insert(name))
    }

    /// Replace every select column with a uniquely aliased `AS` column, e.g.
    /// `book.id` becomes `book.id AS book_id`. Existing aliases are kept.
    fn turn_select_columns_to_aliases(&self, criteria: &mut Criteria) {
        let columns = criteria.select_columns().to_vec();
        let as_columns = criteria.as_columns().to_vec();
        criteria.clear_select_columns();

        let mut taken: HashSet<String> = as_columns.iter().map(|(alias, _)| alias.clone()).collect();
        for column in columns {
            let mut alias = column.replace('.', "_");
            while taken.contains(&alias) {
                alias.push_str("_1");
            }
            taken.insert(alias.clone());
            criteria.add_as_column(alias, column);
        }

        for (alias, expression) in as_columns {
            criteria.add_as_column(alias, expression);
        }
    }
}

/// Column part of a possibly qualified name (`book.id` -> `id`).
fn column_name(column: &str) -> &str {
    column.rsplit('.').next().unwrap_or(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_select_aliases() {
        let assembler = StandardAssembler::new();
        let mut c = Criteria::new("bookstore", "book");
        c.add_select_column("book.id").add_select_column("author.name");
        assert!(!assembler.needs_select_aliases(&c));

        c.add_select_column("author.id");
        assert!(assembler.needs_select_aliases(&c));
    }

    #[test]
    fn test_turn_select_columns_to_aliases() {
        let assembler = StandardAssembler::new();
        let mut c = Criteria::new("bookstore", "book");
        c.add_select_column("book.id")
            .add_select_column("author.id")
            .add_as_column("book_id", "book.isbn");

        assembler.turn_select_columns_to_aliases(&mut c);

        assert!(c.select_columns().is_empty());
        let aliases: Vec<_> = c.as_columns().iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(aliases, vec!["book_id_1", "author_id", "book_id"]);
    }
}
