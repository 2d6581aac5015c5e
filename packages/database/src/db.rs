//! Database lifecycle: opening the `SQLite` file and creating tables.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{Collection, DbError};

/// Default location of the records database.
pub const DEFAULT_DB_PATH: &str = "data/nephro_coach.db";

/// Opens (or creates) the records `SQLite` database at `path` and ensures
/// every collection table exists.
///
/// # Errors
///
/// Returns [`DbError`] if the parent directory cannot be created, the
/// database cannot be opened, or the schema DDL fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log::debug!("Opening records database at {}", path.display());

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Open(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Creates all collection tables if they don't already exist.
///
/// # Errors
///
/// Returns [`DbError::Database`] if any DDL statement fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    for collection in Collection::ALL {
        db.exec_raw(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                document    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            )",
            collection.table()
        ))
        .await?;
    }

    Ok(())
}
