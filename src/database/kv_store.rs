//! [`KeyValueStorage`] backed by the `kv_store` table.

use std::future::{ready, Future};
use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use super::Database;
use crate::host::KeyValueStorage;
use crate::types::errors::StorageError;

#[derive(Clone)]
pub struct SqliteStorage {
    db: Arc<Database>,
}

impl SqliteStorage {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let raw: Option<String> = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::Read(e.to_string()))?;

        raw.map(|text| {
            serde_json::from_str(&text)
                .map_err(|e| StorageError::Corrupt(format!("key '{}': {}", key, e)))
        })
        .transpose()
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(value).map_err(|e| StorageError::Write(e.to_string()))?;
        self.db
            .connection()
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, text, chrono::Utc::now().timestamp()],
            )
            .map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StorageError>> + Send {
        ready(self.read(key))
    }

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<(), StorageError>> + Send {
        ready(self.write(key, &value))
    }
}
