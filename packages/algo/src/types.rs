//! Common Types and Constants
//!
//! Shared data structures used across the curriculum and review modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Lowest ease factor a review item can reach
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned on first study
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Interval (days) after the first successful review
pub const FIRST_INTERVAL_DAYS: u32 = 1;

/// Interval (days) after the second successful review
pub const SECOND_INTERVAL_DAYS: u32 = 6;

/// Longest interval (days) a review can be pushed out, about a century
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Quality ratings below this value count as a lapse
pub const PASSING_QUALITY: u8 = 3;

/// Inclusive bounds of a quality rating
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 5;

// ==================== Curriculum Types ====================

/// 课程节点（主题）
///
/// slug 唯一，是依赖图、路径规则和缓存 key 的连接键。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub category_count: u32,
    /// 完成进度 0..=100
    #[serde(default)]
    pub progress: u8,
}

impl Node {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            category_count: 0,
            progress: 0,
        }
    }
}

// ==================== Review Types ====================

/// 单个学习条目的间隔重复状态
///
/// 首次学习时创建，只由 [`crate::review`] 推导出新状态，旧状态被新状态取代而不是删除。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    #[serde(default)]
    pub item_id: String,
    /// Current interval in days
    pub interval: u32,
    pub ease_factor: f64,
    pub review_count: u32,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewState {
    /// State for an item studied for the first time: due immediately.
    pub fn first_study(item_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            interval: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            review_count: 0,
            next_review_at: now,
        }
    }
}

/// Result of one scheduling step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutcome {
    pub next_review_at: DateTime<Utc>,
    pub interval: u32,
    pub ease_factor: f64,
    pub review_count: u32,
}
