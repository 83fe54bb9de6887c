//! 客户端配置
//!
//! 从环境变量读取，缺失或无法解析时使用默认值。

use std::path::PathBuf;
use std::time::Duration;

use crate::gateway::RetryPolicy;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub request_timeout: Duration,
    /// `None` 时使用内存缓存
    pub cache_db_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取；无法解析的值回退到默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_attempts = lookup("REQUEST_MAX_ATTEMPTS")
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|attempts| *attempts > 0)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        let base_delay_ms = lookup("REQUEST_BASE_DELAY_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_BASE_DELAY_MS);

        let timeout_ms = lookup("REQUEST_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let api_base_url = lookup("API_BASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let cache_db_path = lookup("CACHE_DB_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Self {
            api_base_url,
            max_attempts,
            base_delay: Duration::from_millis(base_delay_ms),
            request_timeout: Duration::from_millis(timeout_ms),
            cache_db_path,
            log_level,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.base_delay)
    }
}
