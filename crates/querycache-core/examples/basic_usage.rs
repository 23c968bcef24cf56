//! Basic usage example - page through a keyed query and count it

use querycache::criteria::{Comparison, Criteria, Criterion};
use querycache::map::{ColumnType, DatabaseMap, TableMap};
use querycache::{BackendKind, QueryCacheConfig, QueryExecutor, Result, SqliteConnection};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .compact()
        .init();

    // Backend from args or the process-local store
    let backend = std::env::args()
        .nth(1)
        .and_then(|name| BackendKind::from_str(&name))
        .unwrap_or(BackendKind::ProcessLocal);

    println!("Using {} backend", backend.as_str());

    let executor = QueryExecutor::builder(QueryCacheConfig::new(backend))
        .database(
            DatabaseMap::new("bookstore").with_table(
                TableMap::new("book")
                    .with_column("id", ColumnType::Integer)
                    .with_column("title", ColumnType::Text)
                    .with_column("price", ColumnType::Real),
            ),
        )
        .build()?;

    let conn = SqliteConnection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE book (id INTEGER PRIMARY KEY, title TEXT, price REAL);
         INSERT INTO book (title, price) VALUES
            ('Dune', 9.99), ('Emma', 7.0), ('1984', 15.0),
            ('Persuasion', 25.0), ('Animal Farm', 30.0);",
    )?;

    let mut query = Criteria::new("bookstore", "book");
    query
        .set_query_key("cheap_books")
        .add_filter(Criterion::new("book", "price", Comparison::LessThan, 20.0))
        .add_order_by("book.title")
        .set_limit(2);

    for page in 0..2 {
        query.set_offset(page * 2);
        let rows = executor.select(&mut query, &conn)?;
        println!("Page {}:", page + 1);
        for row in rows.rows() {
            println!("  - {}", row[1]);
        }
    }

    // Select and count statements differ, so they need their own keys
    query
        .set_query_key("cheap_books_count")
        .set_limit(-1)
        .set_offset(0);
    let total = executor.count(&query, &conn)?;
    println!("Total: {}", total.count_value().unwrap_or(0));

    Ok(())
}
