use std::sync::Arc;

use bookshelf_db::{DbError, Repository};
use thiserror::Error;

use super::models::Book;

#[derive(Error, Debug)]
pub enum BookError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] DbError),
}

pub type BookResult<T> = Result<T, BookError>;

/// Book operations over a record store.
///
/// Stateless apart from the store handle; clones share the store.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn Repository<Book>>,
}

impl BookService {
    pub fn new(repository: Arc<dyn Repository<Book>>) -> Self {
        Self { repository }
    }

    pub async fn find_all(&self) -> BookResult<Vec<Book>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn find_by_id(&self, id: i64) -> BookResult<Book> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound(id))
    }

    pub async fn save(&self, book: Book) -> BookResult<Book> {
        Ok(self.repository.save(book).await?)
    }

    /// Replace the book stored under `id` with the fields of `book`.
    ///
    /// The stored id always comes from `id`; any id carried by `book` is
    /// discarded. Unknown ids fail with [`BookError::NotFound`] and nothing
    /// is written, even when a delete races the update.
    pub async fn update(&self, id: i64, book: Book) -> BookResult<Book> {
        let replacement = Book {
            id: Some(id),
            ..book
        };
        self.repository
            .update(id, replacement)
            .await?
            .ok_or(BookError::NotFound(id))
    }

    /// Idempotent: deleting an unknown id succeeds.
    pub async fn delete_by_id(&self, id: i64) -> BookResult<()> {
        Ok(self.repository.delete_by_id(id).await?)
    }
}
