//! 接口数据模型
//!
//! 与服务端 JSON 一一对应，字段统一 camelCase；
//! 非关键字段带 `#[serde(default)]`，服务端省略时不致解析失败。

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use pathwise_algo::{Node, ReviewState, Scheduled};
use serde::{Deserialize, Serialize};

/// 小节 slug → 是否完成
pub type ProgressMap = HashMap<String, bool>;

// ============================================================
// ExperienceLevel
// ============================================================

/// 经验等级，决定目录与话题聚合的内容深度
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 3] = [
        ExperienceLevel::Beginner,
        ExperienceLevel::Intermediate,
        ExperienceLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == id)
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// 目录与聚合
// ============================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicsResponse {
    pub topics: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInfo {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub section_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub category_slug: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    #[serde(default)]
    pub total_sections: u32,
    #[serde(default)]
    pub completed_sections: u32,
}

impl TopicStats {
    /// 完成百分比 0..=100
    pub fn percent(&self) -> u8 {
        if self.total_sections == 0 {
            return 0;
        }
        let done = self.completed_sections.min(self.total_sections);
        ((u64::from(done) * 100) / u64::from(self.total_sections)) as u8
    }
}

/// 话题聚合：`GET /curriculum/aggregate/topic/{slug}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAggregate {
    pub topic: TopicInfo,
    #[serde(default)]
    pub categories: Vec<CategoryInfo>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub progress: ProgressMap,
    #[serde(default)]
    pub stats: TopicStats,
}

/// 分类聚合：`GET /curriculum/aggregate/category/{topic}/{category}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    pub category: CategoryInfo,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub progress: ProgressMap,
    pub topic: TopicInfo,
}

// ============================================================
// 进度写入
// ============================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSectionRequest {
    pub topic_slug: String,
    pub section_slug: String,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleCategoryRequest {
    pub topic_slug: String,
    pub category_slug: String,
    pub completed: bool,
}

// ============================================================
// 复习
// ============================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DueReviewsResponse {
    pub reviews: Vec<DueReview>,
}

/// 一条待复习条目
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReview {
    pub item_id: String,
    #[serde(default)]
    pub section_name: String,
    pub review_data: ReviewState,
}

impl Scheduled for DueReview {
    fn next_review_at(&self) -> DateTime<Utc> {
        self.review_data.next_review_at
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub topic_slug: String,
    pub section_slug: String,
    pub quality: u8,
}

impl UpdateReviewRequest {
    /// 复习条目 ID：`{topic}/{section}`
    pub fn item_id(&self) -> String {
        format!("{}/{}", self.topic_slug, self.section_slug)
    }
}
