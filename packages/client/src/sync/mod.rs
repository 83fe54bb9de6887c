//! 同步引擎
//!
//! 组合 API、网关与本地缓存，实现页面依赖的数据流：
//! - 目录与聚合：先读缓存即时展示，再经网关拉取权威数据，成功后覆盖缓存
//! - 进度写入：快照 → 乐观更新 → 失效相关缓存 → 网关请求 → 失败时恢复快照
//! - 复习：本地校验评分 → 提交 → 失效复习队列与全局进度
//! - 个性化路径：拉取目录后交给 `CurriculumScheduler`
//!
//! 每个缓存键带一个失效代号。失效时代号递增；代号变化之前发起的拉取
//! 完成后不会写回缓存，也不会与之后发起的拉取合并。

mod catalog;
mod progress;
mod review;

pub use progress::ProgressState;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use pathwise_algo::review::ReviewError;
use pathwise_algo::CurriculumScheduler;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::CurriculumApi;
use crate::gateway::{RequestError, RequestGateway, RequestResult};
use crate::storage::{LocalCache, StorageError, StorageResult, TypedCache};

// ============================================================
// 错误类型定义
// ============================================================

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("请求失败: {0}")]
    Request(#[from] RequestError),

    #[error("本地存储失败: {0}")]
    Storage(#[from] StorageError),

    #[error("复习评分无效: {0}")]
    Review(#[from] ReviewError),
}

pub type SyncResult<T> = Result<T, SyncError>;

// ============================================================
// Revalidated
// ============================================================

/// 一次 stale-while-revalidate 读取的结果
///
/// `cached` 是拉取前缓存中的值；`fresh` 是权威拉取的结果。
/// 拉取失败时缓存保持原样，错误照常返回。
#[derive(Debug)]
pub struct Revalidated<T> {
    pub cached: Option<T>,
    pub fresh: SyncResult<T>,
}

impl<T> Revalidated<T> {
    pub fn into_fresh(self) -> SyncResult<T> {
        self.fresh
    }

    pub fn is_fresh_ok(&self) -> bool {
        self.fresh.is_ok()
    }
}

impl<T: PartialEq> Revalidated<T> {
    /// 权威数据与缓存不同（或缓存为空）
    pub fn changed(&self) -> bool {
        match &self.fresh {
            Ok(fresh) => self.cached.as_ref() != Some(fresh),
            Err(_) => false,
        }
    }
}

// ============================================================
// SyncEngine
// ============================================================

pub struct SyncEngine<A, C: ?Sized> {
    api: Arc<A>,
    cache: Arc<C>,
    gateway: RequestGateway,
    scheduler: CurriculumScheduler,
    epochs: Arc<Mutex<HashMap<String, u64>>>,
    /// 写请求序号；每次写入独占一个请求 ID
    mutation_seq: Arc<AtomicU64>,
}

impl<A, C: ?Sized> Clone for SyncEngine<A, C> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            gateway: self.gateway.clone(),
            scheduler: self.scheduler.clone(),
            epochs: Arc::clone(&self.epochs),
            mutation_seq: Arc::clone(&self.mutation_seq),
        }
    }
}

impl<A, C> SyncEngine<A, C>
where
    A: CurriculumApi,
    C: LocalCache + ?Sized,
{
    pub fn new(api: Arc<A>, cache: Arc<C>, gateway: RequestGateway) -> Self {
        Self {
            api,
            cache,
            gateway,
            scheduler: CurriculumScheduler::default(),
            epochs: Arc::new(Mutex::new(HashMap::new())),
            mutation_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 使用自定义依赖图 / 路径规则
    pub fn with_scheduler(mut self, scheduler: CurriculumScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn scheduler(&self) -> &CurriculumScheduler {
        &self.scheduler
    }

    /// 写请求的 ID：前缀加引擎内递增序号
    ///
    /// 写入不参与去重。相同载荷的两次写入之间可能夹着相反的写入，
    /// 合并到较早的那次会丢掉最后一次意图。
    fn mutation_id(&self, prefix: &str) -> String {
        let seq = self.mutation_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}#{}", prefix, seq)
    }

    // ========== 失效 ==========

    fn epoch(&self, key: &str) -> u64 {
        self.epochs.lock().get(key).copied().unwrap_or(0)
    }

    /// 删除缓存键，并让进行中的旧拉取失去写回资格
    pub fn invalidate_keys(&self, keys: &[String]) -> StorageResult<()> {
        {
            let mut epochs = self.epochs.lock();
            for key in keys {
                *epochs.entry(key.clone()).or_insert(0) += 1;
            }
        }
        debug!(?keys, "invalidating cache keys");
        self.cache.invalidate_all(keys)
    }

    // ========== stale-while-revalidate ==========

    fn peek<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        self.cache.read(key)
    }

    async fn revalidate<T, F, Fut>(&self, key: String, op: F) -> Revalidated<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
    {
        let cached = match self.peek::<T>(&key) {
            Ok(cached) => cached,
            Err(err) => {
                warn!(key = %key, error = %err, "cache read failed, fetching without cached value");
                None
            }
        };

        let epoch = self.epoch(&key);
        let request_id = format!("{}@{}", key, epoch);

        let fresh = match self.gateway.execute(&request_id, op).await {
            Ok(value) => self.store_fresh(&key, epoch, value),
            Err(err) => {
                warn!(key = %key, error = %err, "authoritative fetch failed, cache left untouched");
                Err(err.into())
            }
        };

        Revalidated { cached, fresh }
    }

    fn store_fresh<T: Serialize>(&self, key: &str, epoch: u64, value: T) -> SyncResult<T> {
        if self.epoch(key) != epoch {
            debug!(key, "key invalidated while fetching, result not cached");
            return Ok(value);
        }
        self.cache.write(key, &value)?;
        Ok(value)
    }
}
