//! Key-value store on a SQLite table.

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use hymnal_core::cache::{CacheError, Result};
use hymnal_core::storage::{KeyValueStore, PrefValue};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

const SELECT_VALUE: &str = "SELECT value FROM preferences WHERE key = ?1";
const UPSERT_VALUE: &str = "INSERT INTO preferences (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";
const DELETE_VALUE: &str = "DELETE FROM preferences WHERE key = ?1";
const SELECT_KEYS: &str = "SELECT key FROM preferences ORDER BY key";

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn map_err(e: tokio_rusqlite::Error) -> CacheError {
    CacheError::OperationFailed(e.to_string())
}

/// SQLite-backed key-value store. Values are stored as JSON text.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens (and creates if needed) the database file at `path`.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Self::init_schema(&conn).await?;
        Ok(Self { conn })
    }

    /// Creates a store with an in-memory database.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Self::init_schema(&conn).await?;
        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(CREATE_TABLE).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(map_err)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        let key = key.to_string();
        let raw: Option<String> = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(SELECT_VALUE).map_err(wrap_err)?;
                match stmt.query_row([&key], |row| row.get(0)) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(map_err)?;

        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|e| CacheError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn set(&self, key: &str, value: PrefValue) -> Result<()> {
        let key = key.to_string();
        let raw =
            serde_json::to_string(&value).map_err(|e| CacheError::Serialization(e.to_string()))?;

        self.conn
            .call(move |conn| {
                conn.execute(UPSERT_VALUE, [&key, &raw]).map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_err)
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let removed = conn.execute(DELETE_VALUE, [&key]).map_err(wrap_err)?;
                Ok(removed > 0)
            })
            .await
            .map_err(map_err)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(SELECT_KEYS).map_err(wrap_err)?;
                let rows = stmt.query_map([], |row| row.get(0)).map_err(wrap_err)?;

                let mut keys = Vec::new();
                for row_result in rows {
                    keys.push(row_result.map_err(wrap_err)?);
                }
                Ok(keys)
            })
            .await
            .map_err(map_err)
    }
}
