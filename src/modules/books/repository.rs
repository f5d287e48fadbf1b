//! Table-backed book store.

use async_trait::async_trait;
use bookshelf_db::{Database, DbResult, Repository};
use bookshelf_kernel::Migration;
use rusqlite::{params, OptionalExtension, Row};

use super::models::Book;

pub(crate) const INIT_MIGRATION: Migration = Migration {
    id: "001_init",
    up: "CREATE TABLE book (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT,
        author TEXT,
        isbn TEXT,
        published_date TEXT
    );",
};

const BOOK_SELECT_SQL: &str = "SELECT id, title, author, isbn, published_date FROM book";

/// Stores books in the `book` table created by [`INIT_MIGRATION`].
#[derive(Clone)]
pub struct SqliteBookRepository {
    db: Database,
}

impl SqliteBookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        author: row.get(2)?,
        isbn: row.get(3)?,
        published_date: row.get(4)?,
    })
}

#[async_trait]
impl Repository<Book> for SqliteBookRepository {
    async fn find_all(&self) -> DbResult<Vec<Book>> {
        self.db
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id"))?;
                let books = stmt
                    .query_map([], book_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(books)
            })
            .await
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Book>> {
        self.db
            .call(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("{BOOK_SELECT_SQL} WHERE id = ?1"),
                        params![id],
                        book_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    async fn save(&self, book: Book) -> DbResult<Book> {
        self.db
            .call(move |conn| {
                match book.id {
                    Some(id) => {
                        conn.execute(
                            "INSERT INTO book (id, title, author, isbn, published_date)
                             VALUES (?1, ?2, ?3, ?4, ?5)
                             ON CONFLICT(id) DO UPDATE SET
                                title = excluded.title,
                                author = excluded.author,
                                isbn = excluded.isbn,
                                published_date = excluded.published_date",
                            params![id, book.title, book.author, book.isbn, book.published_date],
                        )?;
                        Ok(book)
                    }
                    None => {
                        conn.execute(
                            "INSERT INTO book (title, author, isbn, published_date)
                             VALUES (?1, ?2, ?3, ?4)",
                            params![book.title, book.author, book.isbn, book.published_date],
                        )?;
                        let id = conn.last_insert_rowid();
                        tracing::debug!(book_id = id, "inserted book row");
                        Ok(Book {
                            id: Some(id),
                            ..book
                        })
                    }
                }
            })
            .await
    }

    async fn update(&self, id: i64, book: Book) -> DbResult<Option<Book>> {
        self.db
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE book
                     SET title = ?2, author = ?3, isbn = ?4, published_date = ?5
                     WHERE id = ?1",
                    params![id, book.title, book.author, book.isbn, book.published_date],
                )?;
                Ok((changed > 0).then(|| Book {
                    id: Some(id),
                    ..book
                }))
            })
            .await
    }

    async fn delete_by_id(&self, id: i64) -> DbResult<()> {
        self.db
            .call(move |conn| {
                conn.execute("DELETE FROM book WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
    }
}
