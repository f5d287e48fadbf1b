use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use bookshelf_http::{
    error::AppError,
    extract::{ApiJson, ApiPath},
};

use super::models::Book;
use super::service::{BookError, BookService};

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::Store(source) => AppError::Internal(anyhow::Error::new(source)),
        }
    }
}

/// HTTP routes for the books module, relative to its `/api/books` mount.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(service)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    let books = service.find_all().await?;
    tracing::debug!(count = books.len(), "listed books");
    Ok(Json(books))
}

async fn get_book(
    State(service): State<BookService>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.find_by_id(id).await?))
}

async fn create_book(
    State(service): State<BookService>,
    ApiJson(book): ApiJson<Book>,
) -> Result<Json<Book>, AppError> {
    let saved = service.save(book).await?;
    tracing::info!(book_id = ?saved.id, "book created");
    Ok(Json(saved))
}

async fn update_book(
    State(service): State<BookService>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(book): ApiJson<Book>,
) -> Result<Json<Book>, AppError> {
    if book.id.is_some_and(|body_id| body_id != id) {
        tracing::debug!(book_id = id, body_id = ?book.id, "ignoring id in request body");
    }
    let updated = service.update(id, book).await?;
    tracing::info!(book_id = id, "book updated");
    Ok(Json(updated))
}

async fn delete_book(
    State(service): State<BookService>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    service.delete_by_id(id).await?;
    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
