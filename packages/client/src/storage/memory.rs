//! 内存缓存实现

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use super::{LocalCache, StorageResult};

/// 进程内缓存
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, payload: &Value) -> StorageResult<()> {
        self.entries.write().insert(key.to_string(), payload.clone());
        Ok(())
    }

    fn invalidate(&self, key: &str) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
