//! Shared SQLite connection handle.
//!
//! `rusqlite::Connection` is blocking and not `Sync`, so the handle keeps it
//! behind a mutex and runs every call on tokio's blocking pool. One call holds
//! the connection for its whole closure, which makes each repository
//! operation atomic with respect to the others.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::{DbError, DbResult};

const IN_MEMORY_PATH: &str = ":memory:";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Cloneable handle to a single SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open a database file, or a private in-memory database for `:memory:`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if path == Path::new(IN_MEMORY_PATH) {
            return Self::open_in_memory();
        }

        let started_at = Instant::now();
        let conn = Connection::open(path).inspect_err(|err| {
            tracing::error!(
                target: "bookshelf-db",
                path = %path.display(),
                error = %err,
                "failed to open database"
            );
        })?;
        let db = Self::bootstrap(conn)?;

        tracing::info!(
            target: "bookshelf-db",
            path = %path.display(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "database opened"
        );
        Ok(db)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self::bootstrap(conn)?;

        tracing::info!(target: "bookshelf-db", "in-memory database opened");
        Ok(db)
    }

    fn bootstrap(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| DbError::Poisoned)?;
            f(&mut guard)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn call_runs_statements_on_the_shared_connection() {
        let db = Database::open_in_memory().unwrap();

        db.call(|conn| {
            conn.execute_batch("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT);")?;
            conn.execute("INSERT INTO kv (k, v) VALUES ('a', '1')", [])?;
            Ok(())
        })
        .await
        .unwrap();

        let clone = db.clone();
        let value: String = clone
            .call(|conn| Ok(conn.query_row("SELECT v FROM kv WHERE k = 'a'", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(value, "1");
    }

    #[tokio::test]
    async fn sqlite_errors_surface_as_db_errors() {
        let db = Database::open(IN_MEMORY_PATH).unwrap();

        let err = db
            .call(|conn| Ok(conn.execute("INSERT INTO missing VALUES (1)", [])?))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[tokio::test]
    async fn foreign_keys_are_enabled() {
        let db = Database::open_in_memory().unwrap();
        let enabled: i64 = db
            .call(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
