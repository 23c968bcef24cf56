//! Querycache - statement cache for structured SQL queries.
//!
//! A query tagged with a cache key has its generated SQL stored after the first
//! execution. Later executions under the same key skip SQL assembly and reuse
//! the stored template, as long as its placeholder count still matches the
//! freshly collected bind parameters. Pagination is appended per call and never
//! stored.
//!
//! # Example
//!
//! ```rust,no_run
//! use querycache::adapter::SqliteConnection;
//! use querycache::config::{BackendKind, QueryCacheConfig};
//! use querycache::criteria::{Criteria, Criterion};
//! use querycache::map::{ColumnType, DatabaseMap, TableMap};
//! use querycache::QueryExecutor;
//!
//! fn main() -> querycache::Result<()> {
//!     let executor = QueryExecutor::builder(QueryCacheConfig::new(BackendKind::ProcessLocal))
//!         .database(
//!             DatabaseMap::new("bookstore").with_table(
//!                 TableMap::new("book")
//!                     .with_column("id", ColumnType::Integer)
//!                     .with_column("title", ColumnType::Text),
//!             ),
//!         )
//!         .build()?;
//!
//!     let conn = SqliteConnection::open("bookstore.db")?;
//!
//!     let mut query = Criteria::new("bookstore", "book");
//!     query
//!         .set_query_key("books_by_title")
//!         .add_filter(Criterion::equal("book", "title", "Dune"));
//!
//!     let rows = executor.select(&mut query, &conn)?;
//!     println!("Found {} books", rows.len());
//!
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod cache;
pub mod config;
pub mod criteria;
pub mod error;
pub mod executor;
pub mod map;
pub mod sql;
pub mod statement;

// Re-export commonly used types
pub use adapter::{Connection, RowSet, SqliteConnection};
pub use cache::{CacheBackend, DisabledCache, ProcessLocalCache, SharedCache};
pub use config::{BackendKind, QueryCacheConfig};
pub use criteria::{BindParam, Criteria, Criterion, SqlValue};
pub use error::{QueryCacheError, Result, StatementKind};
pub use executor::{QueryExecutor, QueryExecutorBuilder};
pub use statement::{CacheKey, CacheLookup, StatementCache};
