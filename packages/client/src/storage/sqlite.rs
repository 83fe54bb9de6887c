//! SQLite 缓存实现
//!
//! 所有条目存放在单表 `kv_store` 中，值为 JSON 文本。

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{info, warn};

use super::{LocalCache, StorageError, StorageResult};

const INIT_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

/// SQLite 持久化缓存
pub struct SqliteCache {
    connection: Mutex<Connection>,
    db_path: String,
}

impl std::fmt::Debug for SqliteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCache")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl SqliteCache {
    /// 打开（或创建）数据库文件
    ///
    /// 启用 WAL 模式并确保表存在。
    pub fn open<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy().to_string();
        let connection = Connection::open(&db_path)?;

        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;

        let cache = Self::with_connection(connection, path_str)?;
        info!(db_path = %cache.db_path, "sqlite cache opened");
        Ok(cache)
    }

    /// 创建内存数据库（用于测试）
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::with_connection(connection, ":memory:".to_string())
    }

    fn with_connection(connection: Connection, db_path: String) -> StorageResult<Self> {
        connection.execute_batch(INIT_SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
            db_path,
        })
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 当前条目数
    pub fn len(&self) -> StorageResult<usize> {
        let conn = self.get_connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    fn get_connection(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }
}

impl LocalCache for SqliteCache {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let conn = self.get_connection()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, error = %err, "stored cache value is not valid JSON, treating as miss");
                Ok(None)
            }
        }
    }

    fn put(&self, key: &str, payload: &Value) -> StorageResult<()> {
        let raw = serde_json::to_string(payload)?;
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, raw, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn invalidate(&self, key: &str) -> StorageResult<()> {
        let conn = self.get_connection()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn invalidate_all(&self, keys: &[String]) -> StorageResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        for key in keys {
            tx.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        }
        tx.commit()?;
        Ok(())
    }
}
