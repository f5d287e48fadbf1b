//! Record store abstraction for bookshelf.
//!
//! [`Repository`] is the capability set the service layer consumes. Two
//! adapters exist: [`InMemoryRepository`] keeps records in a map keyed by id,
//! and [`Database`] is the shared SQLite handle that table-backed
//! repositories are written against.
//!
//! Absence is never an error at this layer: lookups return `Option` and
//! deletes of unknown ids are silent. Callers decide what a missing record
//! means.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod migrate;
pub mod sqlite;

pub use memory::InMemoryRepository;
pub use migrate::apply_migrations;
pub use sqlite::Database;

pub type DbResult<T> = Result<T, DbError>;

/// Infrastructure failure raised by a record store.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("blocking database task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("record ids exhausted")]
    IdExhausted,
}

/// A record with a store-assigned integer identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identifier, absent until the record is first persisted.
    fn id(&self) -> Option<i64>;

    /// Return the record with its identifier replaced.
    fn with_id(self, id: i64) -> Self;
}

/// Keyed storage over records of type `E`.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Every stored record, ordered by id.
    async fn find_all(&self) -> DbResult<Vec<E>>;

    /// The record with `id`, or `None` when absent.
    async fn find_by_id(&self, id: i64) -> DbResult<Option<E>>;

    /// Insert when the id is absent (assigning one), otherwise overwrite.
    async fn save(&self, entity: E) -> DbResult<E>;

    /// Replace the record stored under `id`, which also becomes the id of
    /// `entity`. Returns `None` and writes nothing when no such record exists.
    ///
    /// The existence check and the write happen as one step, so a concurrent
    /// delete can never be undone by an update.
    async fn update(&self, id: i64, entity: E) -> DbResult<Option<E>>;

    /// Remove the record with `id`; a no-op when absent.
    async fn delete_by_id(&self, id: i64) -> DbResult<()>;
}
