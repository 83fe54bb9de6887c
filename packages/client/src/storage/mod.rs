//! 本地缓存模块
//!
//! 服务端聚合数据与客户端状态的键值持久层：
//! - `LocalCache` trait：get / put / invalidate，可注入、可替换
//! - `MemoryCache`：进程内实现（测试、无持久化场景）
//! - `SqliteCache`：SQLite 持久化实现
//! - `TypedCache`：JSON 类型化读写，解析失败按未命中处理
//!
//! 缓存条目没有过期时间，只会被显式失效（删除）。

// ============================================================
// 子模块声明
// ============================================================

pub mod client_state;
pub mod keys;
pub mod memory;
pub mod sqlite;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use client_state::{Bookmark, ClientStateStore, StreakRecord};
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

// ============================================================
// 依赖导入
// ============================================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

// ============================================================
// 错误类型定义
// ============================================================

/// 存储模块错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("锁获取失败: {0}")]
    LockError(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// LocalCache
// ============================================================

/// 键值缓存
///
/// 同一个键的写入按调用顺序生效（后写覆盖先写）；`invalidate` 幂等，
/// 删除不存在的键不是错误。
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    fn put(&self, key: &str, payload: &Value) -> StorageResult<()>;

    fn invalidate(&self, key: &str) -> StorageResult<()>;

    /// 批量失效，遇到第一个错误即返回
    fn invalidate_all(&self, keys: &[String]) -> StorageResult<()> {
        for key in keys {
            self.invalidate(key)?;
        }
        Ok(())
    }
}

/// 类型化读写
///
/// 对所有 `LocalCache` 自动实现。
pub trait TypedCache: LocalCache {
    /// 读取并反序列化
    ///
    /// 条目无法解析为 `T` 时记录警告并视为未命中，不返回错误。
    fn read<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(payload) = self.get(key)? else {
            debug!(key, "cache miss");
            return Ok(None);
        };

        match serde_json::from_value(payload) {
            Ok(value) => {
                debug!(key, "cache hit");
                Ok(Some(value))
            }
            Err(err) => {
                warn!(key, error = %err, "cache entry unreadable, treating as miss");
                Ok(None)
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let payload = serde_json::to_value(value)?;
        self.put(key, &payload)
    }
}

impl<C: LocalCache + ?Sized> TypedCache for C {}
