//! Applies module-contributed migrations to a SQLite database.
//!
//! Applied migrations are recorded as `(module, id)` rows in
//! `schema_migrations`; a recorded migration is skipped on later runs. All
//! pending migrations of one run share a transaction.

use bookshelf_kernel::Migration;
use rusqlite::{params, Connection};

use crate::{Database, DbError, DbResult};

const CREATE_LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    module TEXT NOT NULL,
    id TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (module, id)
);";

/// Apply every migration not yet recorded and return how many ran.
pub async fn apply_migrations(
    db: &Database,
    migrations: Vec<(String, Migration)>,
) -> DbResult<usize> {
    let applied = db.call(move |conn| apply_pending(conn, &migrations)).await?;

    tracing::info!(target: "bookshelf-db", applied, "migrations complete");
    Ok(applied)
}

fn apply_pending(conn: &mut Connection, migrations: &[(String, Migration)]) -> DbResult<usize> {
    conn.execute_batch(CREATE_LEDGER_SQL)?;

    let tx = conn.transaction()?;
    let mut applied = 0;

    for (module, migration) in migrations {
        let recorded: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE module = ?1 AND id = ?2)",
            params![module, migration.id],
            |row| row.get(0),
        )?;
        if recorded {
            tracing::debug!(target: "bookshelf-db", module = %module, id = migration.id, "migration already applied");
            continue;
        }

        tracing::info!(target: "bookshelf-db", module = %module, id = migration.id, "applying migration");
        tx.execute_batch(migration.up)
            .map_err(|source| DbError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            })?;
        tx.execute(
            "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)",
            params![module, migration.id],
        )?;
        applied += 1;
    }

    tx.commit()?;
    Ok(applied)
}
