//! SQLite blob store (`blobs` key/value table).

use crate::domain::error::JournalError;
use crate::ports::blob_port::BlobStore;
use crate::ports::config_port::ConfigPort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};

pub struct SqliteBlobStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteBlobStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, JournalError> {
        let db_path =
            config
                .get_string("storage", "path")
                .ok_or_else(|| JournalError::ConfigMissing {
                    section: "storage".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("storage", "pool_size", 2).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| JournalError::storage(e))?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, JournalError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| JournalError::storage(e))?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, JournalError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| JournalError::storage(e))
    }

    pub fn initialize_schema(&self) -> Result<(), JournalError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS blobs (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .map_err(|e: rusqlite::Error| JournalError::storage(e))?;
        Ok(())
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        let conn = self.connection()?;
        conn.query_row(
            "SELECT value FROM blobs WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e: rusqlite::Error| JournalError::storage(e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), JournalError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO blobs (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )
        .map_err(|e: rusqlite::Error| JournalError::storage(e))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), JournalError> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM blobs WHERE key = ?1", params![key])
            .map_err(|e: rusqlite::Error| JournalError::storage(e))?;
        Ok(())
    }
}
