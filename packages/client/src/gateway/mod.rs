//! 请求网关
//!
//! 包装所有对外请求的策略层：
//! - 指数退避重试（4xx 立即失败，其它错误重试到上限）
//! - 同 ID 并发请求去重：后到的调用方共享同一个进行中的结果
//! - 可选的取消信号
//!
//! 去重包在重试外层，并发的相同请求共享同一串重试尝试。
//! 网关自身只持有进程内的进行中请求表，请求结束（成功或失败）后表项自动移除。

mod cancel;
mod retry;

pub use cancel::{CancelHandle, CancelSignal};
pub use retry::RetryPolicy;

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

// ============================================================
// 错误类型定义
// ============================================================

/// 请求错误
///
/// 需要 `Clone`：去重后的多个调用方拿到同一个结果。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("请求被拒绝 (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    #[error("服务端错误 (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("网络错误: {0}")]
    Network(String),

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("请求已取消: {0}")]
    Cancelled(String),

    #[error("请求 {0} 的共享结果类型不匹配")]
    TypeMismatch(String),
}

impl RequestError {
    /// 4xx → `Client`，其余 → `Server`
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            RequestError::Client { status, message }
        } else {
            RequestError::Server { status, message }
        }
    }

    /// Client errors and caller-side failures are surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RequestError::Server { .. } | RequestError::Network(_) | RequestError::Decode(_)
        )
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, RequestError::Client { .. })
    }
}

pub type RequestResult<T> = Result<T, RequestError>;

// ============================================================
// RequestGateway
// ============================================================

type SharedValue = Arc<dyn Any + Send + Sync>;
type InFlight = Shared<BoxFuture<'static, Result<SharedValue, RequestError>>>;

/// 进行中请求表
///
/// 每个表项带一个代号：只有发起它的那串尝试（或放弃它的发起方）才能移除它，
/// 避免误删之后同 ID 新发起的请求。
#[derive(Default)]
struct Registry {
    next_generation: u64,
    entries: HashMap<String, (u64, InFlight)>,
}

impl Registry {
    fn remove_if(&mut self, request_id: &str, generation: u64) {
        if self
            .entries
            .get(request_id)
            .is_some_and(|(current, _)| *current == generation)
        {
            self.entries.remove(request_id);
        }
    }
}

/// 重试 + 去重网关
///
/// `Clone` 共享同一张进行中请求表。
#[derive(Clone, Default)]
pub struct RequestGateway {
    policy: RetryPolicy,
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("policy", &self.policy)
            .field("in_flight", &self.in_flight_count())
            .finish()
    }
}

impl RequestGateway {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn in_flight_count(&self) -> usize {
        self.registry.lock().entries.len()
    }

    pub fn is_in_flight(&self, request_id: &str) -> bool {
        self.registry.lock().entries.contains_key(request_id)
    }

    /// 执行请求（重试 + 去重）
    ///
    /// 若相同 `request_id` 的请求正在进行，直接等待它的结果，`op` 不会被调用。
    pub async fn execute<T, F, Fut>(&self, request_id: &str, op: F) -> RequestResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
    {
        self.execute_with_cancel(request_id, CancelSignal::never(), op)
            .await
    }

    /// 带取消信号执行
    ///
    /// 加入已有请求的调用方取消时只是停止等待。发起方取消时：退避等待被中止、
    /// 不再发起新的尝试，表项被移除（之后同 ID 的调用重新发起）；
    /// 若没有其他调用方在等待，进行中的尝试随之被丢弃。
    pub async fn execute_with_cancel<T, F, Fut>(
        &self,
        request_id: &str,
        mut cancel: CancelSignal,
        op: F,
    ) -> RequestResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
    {
        if cancel.is_cancelled() {
            return Err(RequestError::Cancelled(request_id.to_string()));
        }

        let (pending, started) = self.join_or_start(request_id, cancel.clone(), op);

        let value = tokio::select! {
            biased;
            result = pending => result?,
            _ = cancel.cancelled() => {
                if let Some(generation) = started {
                    self.registry.lock().remove_if(request_id, generation);
                }
                debug!(request_id, originator = started.is_some(), "caller stopped waiting for request");
                return Err(RequestError::Cancelled(request_id.to_string()));
            }
        };

        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| RequestError::TypeMismatch(request_id.to_string()))
    }

    /// Returns the shared attempt sequence, plus its generation when this call started it.
    fn join_or_start<T, F, Fut>(
        &self,
        request_id: &str,
        cancel: CancelSignal,
        op: F,
    ) -> (InFlight, Option<u64>)
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
    {
        let mut registry = self.registry.lock();
        if let Some((_, pending)) = registry.entries.get(request_id) {
            debug!(request_id, "joining in-flight request");
            return (pending.clone(), None);
        }

        let generation = registry.next_generation;
        registry.next_generation += 1;

        let shared_registry = Arc::clone(&self.registry);
        let policy = self.policy;
        let id = request_id.to_string();

        let pending = async move {
            let result = retry::run_with_retry(&id, policy, op, cancel).await;
            // 结束即移除，之后同 ID 的调用重新发起
            shared_registry.lock().remove_if(&id, generation);
            result.map(|value| Arc::new(value) as SharedValue)
        }
        .boxed()
        .shared();

        registry
            .entries
            .insert(request_id.to_string(), (generation, pending.clone()));
        (pending, Some(generation))
    }
}
