//! Statement execution.
//!
//! The executor hands finished SQL text and bind parameters to a
//! [`Connection`], which prepares, binds and executes the statement and returns
//! whatever row-fetching handle it uses.

mod sqlite;

pub use sqlite::{RowSet, SqliteConnection};

use crate::criteria::BindParam;
use crate::map::DatabaseMap;

/// Prepares, binds and executes statements.
pub trait Connection {
    /// Row-fetching handle over an executed statement.
    type Rows;
    /// Failure raised while preparing or executing.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute `sql`, binding `params` positionally to `:p1`..`:pN`.
    ///
    /// `db_map` describes the columns the parameters are compared against, so
    /// values can be bound with the right type.
    fn execute(
        &self,
        sql: &str,
        params: &[BindParam],
        db_map: &DatabaseMap,
    ) -> std::result::Result<Self::Rows, Self::Error>;
}
