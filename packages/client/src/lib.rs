//! # pathwise-client - 学习进度同步客户端
//!
//! 页面层调用的同步核心:
//!
//! - **RequestGateway** - 指数退避重试 + 同 ID 请求去重 + 可选取消
//! - **LocalCache** - 服务端聚合数据的键值缓存（内存 / SQLite），只做显式失效
//! - **SyncEngine** - stale-while-revalidate 读取、带回滚的乐观进度更新、复习提交
//! - **ClientStateStore** - 引导标记、学习目标、连续学习天数、书签
//!
//! 路径生成与复习调度的算法在 `pathwise-algo` 中。
//!
//! ## 模块结构
//!
//! - [`api`] - REST 接口 trait 与 reqwest 实现
//! - [`gateway`] - 重试 / 去重 / 取消
//! - [`storage`] - 本地缓存与客户端状态
//! - [`sync`] - 同步引擎
//! - [`config`] - 环境变量配置
//! - [`logging`] - tracing 初始化
//!
//! ## 启动
//!
//! 宿主应用启动时调用一次 [`start`]：按配置安装 tracing subscriber 并组装引擎。
//! 已自行安装 subscriber 的宿主直接调用 [`build_engine`]。
//!
//! ```no_run
//! use pathwise_client::{start, ClientConfig};
//!
//! let (engine, _log_guard) = start(&ClientConfig::from_env()).expect("cache");
//! # let _ = engine;
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod api;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod storage;
pub mod sync;

// ============================================================================
// 重新导出
// ============================================================================

pub use api::{CurriculumApi, ExperienceLevel, HttpCurriculumApi};
pub use config::ClientConfig;
pub use logging::FileLogGuard;
pub use gateway::{CancelHandle, CancelSignal, RequestError, RequestGateway, RetryPolicy};
pub use storage::{ClientStateStore, LocalCache, MemoryCache, SqliteCache, StorageError, TypedCache};
pub use sync::{ProgressState, Revalidated, SyncEngine, SyncError, SyncResult};

/// 重新导出算法层
pub use pathwise_algo;

use std::sync::Arc;

/// 按配置组装生产环境的同步引擎
///
/// 配置了 `CACHE_DB_PATH` 时使用 SQLite 缓存，否则使用内存缓存。
pub fn build_engine(
    config: &ClientConfig,
) -> Result<SyncEngine<HttpCurriculumApi, dyn LocalCache>, StorageError> {
    let cache: Arc<dyn LocalCache> = match &config.cache_db_path {
        Some(path) => Arc::new(SqliteCache::open(path)?),
        None => Arc::new(MemoryCache::new()),
    };

    Ok(SyncEngine::new(
        Arc::new(HttpCurriculumApi::from_config(config)),
        cache,
        RequestGateway::new(config.retry_policy()),
    ))
}

/// 初始化日志并组装引擎
///
/// 返回的 [`FileLogGuard`] 需要与引擎一起保留，丢弃后文件日志停止刷盘。
pub fn start(
    config: &ClientConfig,
) -> Result<(SyncEngine<HttpCurriculumApi, dyn LocalCache>, Option<FileLogGuard>), StorageError> {
    let log_guard = logging::init_tracing(&config.log_level);
    let engine = build_engine(config)?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        persistent_cache = config.cache_db_path.is_some(),
        "sync engine ready"
    );
    Ok((engine, log_guard))
}
