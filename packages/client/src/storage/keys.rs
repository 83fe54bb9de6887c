//! 缓存 key 构建
//!
//! 以及每类写操作需要失效的 key 集合。

use crate::api::models::ExperienceLevel;

pub const GLOBAL_PROGRESS_KEY: &str = "progress:global";
pub const DUE_REVIEWS_KEY: &str = "reviews:due";

pub const ONBOARDING_COMPLETE_KEY: &str = "client:onboarding-complete";
pub const LEARNING_PATH_KEY: &str = "client:learning-path";
pub const EXPERIENCE_LEVEL_KEY: &str = "client:experience-level";
pub const STREAK_KEY: &str = "client:streak";
pub const BOOKMARKS_KEY: &str = "client:bookmarks";

pub fn topic_key(slug: &str, level: ExperienceLevel) -> String {
    format!("topic:{}:{}", slug, level)
}

pub fn category_key(topic_slug: &str, category_slug: &str) -> String {
    format!("category:{}:{}", topic_slug, category_slug)
}

pub fn topics_key(level: ExperienceLevel) -> String {
    format!("topics:{}", level)
}

pub fn global_progress_key() -> &'static str {
    GLOBAL_PROGRESS_KEY
}

pub fn due_reviews_key() -> &'static str {
    DUE_REVIEWS_KEY
}

/// 完成一个小节（或整个分类）后可能过期的所有键
///
/// 话题聚合与话题目录按所有经验等级展开，因为进度与等级无关。
pub fn progress_affected_keys(topic_slug: &str, category_slug: &str) -> Vec<String> {
    let mut keys = Vec::with_capacity(2 + ExperienceLevel::ALL.len() * 2);
    keys.push(category_key(topic_slug, category_slug));
    keys.extend(
        ExperienceLevel::ALL
            .iter()
            .map(|level| topic_key(topic_slug, *level)),
    );
    keys.extend(ExperienceLevel::ALL.iter().map(|level| topics_key(*level)));
    keys.push(GLOBAL_PROGRESS_KEY.to_string());
    keys
}

/// 提交复习后可能过期的键
pub fn review_affected_keys() -> Vec<String> {
    vec![DUE_REVIEWS_KEY.to_string(), GLOBAL_PROGRESS_KEY.to_string()]
}
