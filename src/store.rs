use std::path::Path;

use anyhow::Context as _;
use rusqlite::{Connection, params};

use crate::formats::CanonicalBook;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY,
    title TEXT,
    author TEXT,
    isbn TEXT NOT NULL UNIQUE,
    rank INTEGER,
    list_name TEXT,
    weeks_on_list INTEGER NOT NULL,
    publisher TEXT,
    published_date TEXT,
    page_count INTEGER NOT NULL,
    genres TEXT NOT NULL,
    language TEXT NOT NULL,
    average_rating REAL NOT NULL,
    ratings_count INTEGER NOT NULL,
    cover_image_url TEXT,
    buy_links TEXT NOT NULL,
    description TEXT NOT NULL,
    data_source TEXT NOT NULL,
    ingested_at TEXT NOT NULL DEFAULT (datetime('now'))
);
";

const INSERT_SQL: &str = "
INSERT OR IGNORE INTO books (
    title, author, isbn, rank, list_name, weeks_on_list, publisher,
    published_date, page_count, genres, language, average_rating,
    ratings_count, cover_image_url, buy_links, description, data_source
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);
";

/// SQLite-backed store for canonical book records. `isbn` is the uniqueness
/// key; existing rows are never updated.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database and ensure the `books` schema exists.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("open books database: {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory books database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(SCHEMA_SQL).context("ensure books schema")?;
        Ok(Self { conn })
    }

    /// Insert a batch inside one transaction (all-or-nothing). Records with a
    /// missing or empty isbn are skipped with a warning; for the rest an
    /// insert-or-ignore is attempted, so a record whose isbn is already stored
    /// is silently dropped. Returns the number of attempted inserts, which
    /// does not distinguish inserted rows from ignored duplicates.
    pub fn insert_batch(&mut self, books: &[CanonicalBook]) -> anyhow::Result<usize> {
        let tx = self.conn.transaction().context("begin insert transaction")?;
        let mut attempted = 0usize;

        for book in books {
            let Some(isbn) = book.isbn.as_deref().filter(|isbn| !isbn.is_empty()) else {
                tracing::warn!(title = %book.title, "skipping record with missing isbn");
                continue;
            };

            tx.execute(
                INSERT_SQL,
                params![
                    book.title,
                    book.author,
                    isbn,
                    book.rank,
                    book.list_name,
                    book.weeks_on_list,
                    book.publisher,
                    book.published_date,
                    book.page_count,
                    book.genres,
                    book.language,
                    book.average_rating,
                    book.ratings_count,
                    book.cover_image_url,
                    book.buy_links,
                    book.description,
                    book.data_source,
                ],
            )
            .with_context(|| format!("insert book with isbn {isbn}"))?;
            attempted += 1;
        }

        tx.commit().context("commit insert transaction")?;
        Ok(attempted)
    }

    pub fn row_count(&self) -> anyhow::Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .context("count book rows")?;
        Ok(count)
    }

    /// Rows where `column` is NULL or the empty string. The column name comes
    /// from the audit battery's fixed list, never from input.
    pub fn null_or_empty_count(&self, column: &str) -> anyhow::Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM books WHERE {column} IS NULL OR {column} = ''");
        let count = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("count rows missing {column}"))?;
        Ok(count)
    }

    pub fn duplicate_isbn_count(&self) -> anyhow::Result<i64> {
        let count = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM (SELECT isbn FROM books GROUP BY isbn HAVING COUNT(*) > 1)",
                [],
                |row| row.get(0),
            )
            .context("count duplicate isbns")?;
        Ok(count)
    }

    /// Rows violating a numeric range `condition` from the audit battery's
    /// fixed list.
    pub fn out_of_range_count(&self, condition: &str) -> anyhow::Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM books WHERE {condition}");
        let count = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("count rows where {condition}"))?;
        Ok(count)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
