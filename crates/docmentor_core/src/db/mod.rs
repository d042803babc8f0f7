use std::path::Path;

use rusqlite::Connection;

use crate::error::AppError;

/// Schema version recorded in SQLite's `user_version` once the tables exist.
const SCHEMA_VERSION: i64 = 1;

const VECTOR_STORE_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../migrations/0001_vector_store.sql"
));

pub fn open(path: &Path) -> Result<Connection, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new("DB_OPEN_FAILED", "Failed to create database directory")
                .with_details(format!("path={}; err={}", parent.display(), e))
        })?;
    }
    Connection::open(path).map_err(|e| {
        AppError::new("DB_OPEN_FAILED", "Failed to open SQLite database")
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

pub fn open_in_memory() -> Result<Connection, AppError> {
    Connection::open_in_memory().map_err(|e| {
        AppError::new("DB_OPEN_FAILED", "Failed to open in-memory SQLite database")
            .with_details(e.to_string())
    })
}

fn schema_err(code: &str, message: &str, e: rusqlite::Error) -> AppError {
    AppError::new(code, message).with_details(e.to_string())
}

/// Create the embedding-store tables on a fresh database. A database already at
/// [`SCHEMA_VERSION`] is left untouched.
pub fn migrate(conn: &mut Connection) -> Result<(), AppError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| schema_err("DB_SCHEMA_READ_FAILED", "Failed to read schema version", e))?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .map_err(|e| schema_err("DB_TX_FAILED", "Failed to start schema transaction", e))?;
    tx.execute_batch(VECTOR_STORE_SCHEMA)
        .map_err(|e| schema_err("DB_MIGRATION_FAILED", "Failed to create embedding store tables", e))?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(|e| schema_err("DB_MIGRATION_FAILED", "Failed to record schema version", e))?;
    tx.commit()
        .map_err(|e| schema_err("DB_TX_FAILED", "Failed to commit schema transaction", e))?;

    tracing::debug!(from = version, to = SCHEMA_VERSION, "embedding store schema created");
    Ok(())
}
