//! 客户端持久状态
//!
//! 引导完成标记、已选学习目标、经验等级、学习连续天数、书签，
//! 都以普通 JSON 存放在 [`LocalCache`] 的 `client:*` 键下。

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use pathwise_algo::Goal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keys::{
    BOOKMARKS_KEY, EXPERIENCE_LEVEL_KEY, LEARNING_PATH_KEY, ONBOARDING_COMPLETE_KEY, STREAK_KEY,
};
use super::{LocalCache, StorageResult, TypedCache};
use crate::api::models::ExperienceLevel;

/// 最多保留的学习日期数
pub const MAX_STUDY_DATES: usize = 365;

// ============================================================
// 连续学习记录
// ============================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default)]
    pub last_visit: Option<NaiveDate>,
    /// 去重、按时间先后排列，最新的在末尾
    #[serde(default)]
    pub study_dates: Vec<NaiveDate>,
}

impl StreakRecord {
    /// 记录一次访问，返回记录是否发生变化
    ///
    /// - 同一天重复访问：不变
    /// - 紧接上次访问的下一天：连续天数 +1
    /// - 中间有间隔：连续天数重置为 1
    /// - 早于上次访问的日期（时钟回拨）：忽略
    pub fn record_visit(&mut self, today: NaiveDate) -> bool {
        match self.last_visit {
            Some(last) if today <= last => return false,
            Some(last) if last.succ_opt() == Some(today) => {
                self.current_streak = self.current_streak.saturating_add(1);
            }
            _ => self.current_streak = 1,
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_visit = Some(today);

        if !self.study_dates.contains(&today) {
            self.study_dates.push(today);
        }
        if self.study_dates.len() > MAX_STUDY_DATES {
            let overflow = self.study_dates.len() - MAX_STUDY_DATES;
            self.study_dates.drain(..overflow);
        }
        true
    }

    /// 上次访问不是今天或昨天时，连续记录已中断
    pub fn is_broken(&self, today: NaiveDate) -> bool {
        match self.last_visit {
            Some(last) => last != today && last.succ_opt() != Some(today),
            None => false,
        }
    }
}

// ============================================================
// 书签
// ============================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub topic_slug: String,
    pub section_slug: String,
    #[serde(default)]
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(
        topic_slug: impl Into<String>,
        section_slug: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            topic_slug: topic_slug.into(),
            section_slug: section_slug.into(),
            title: title.into(),
            created_at,
        }
    }

    fn is_for(&self, topic_slug: &str, section_slug: &str) -> bool {
        self.topic_slug == topic_slug && self.section_slug == section_slug
    }
}

// ============================================================
// ClientStateStore
// ============================================================

/// 客户端状态仓储
pub struct ClientStateStore<C: ?Sized> {
    cache: Arc<C>,
}

impl<C: ?Sized> Clone for ClientStateStore<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C: LocalCache + ?Sized> ClientStateStore<C> {
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }

    // ========== 引导 ==========

    pub fn is_onboarding_complete(&self) -> StorageResult<bool> {
        Ok(self.cache.read::<bool>(ONBOARDING_COMPLETE_KEY)?.unwrap_or(false))
    }

    pub fn set_onboarding_complete(&self, complete: bool) -> StorageResult<()> {
        self.cache.write(ONBOARDING_COMPLETE_KEY, &complete)
    }

    // ========== 学习目标 / 经验等级 ==========

    /// 无法识别的目标 ID 视为未选择
    pub fn learning_path(&self) -> StorageResult<Option<Goal>> {
        self.cache.read(LEARNING_PATH_KEY)
    }

    pub fn set_learning_path(&self, goal: Goal) -> StorageResult<()> {
        self.cache.write(LEARNING_PATH_KEY, &goal)
    }

    pub fn experience_level(&self) -> StorageResult<Option<ExperienceLevel>> {
        self.cache.read(EXPERIENCE_LEVEL_KEY)
    }

    pub fn set_experience_level(&self, level: ExperienceLevel) -> StorageResult<()> {
        self.cache.write(EXPERIENCE_LEVEL_KEY, &level)
    }

    // ========== 连续学习 ==========

    pub fn streak(&self) -> StorageResult<StreakRecord> {
        Ok(self.cache.read(STREAK_KEY)?.unwrap_or_default())
    }

    /// 记录今天的访问并持久化，返回更新后的记录
    pub fn record_visit(&self, today: NaiveDate) -> StorageResult<StreakRecord> {
        let mut streak = self.streak()?;
        if streak.record_visit(today) {
            debug!(%today, current = streak.current_streak, "streak updated");
            self.cache.write(STREAK_KEY, &streak)?;
        }
        Ok(streak)
    }

    // ========== 书签 ==========

    pub fn bookmarks(&self) -> StorageResult<Vec<Bookmark>> {
        Ok(self.cache.read(BOOKMARKS_KEY)?.unwrap_or_default())
    }

    pub fn is_bookmarked(&self, topic_slug: &str, section_slug: &str) -> StorageResult<bool> {
        Ok(self
            .bookmarks()?
            .iter()
            .any(|b| b.is_for(topic_slug, section_slug)))
    }

    /// 已存在则移除，否则追加；返回操作后是否处于收藏状态
    pub fn toggle_bookmark(&self, bookmark: Bookmark) -> StorageResult<bool> {
        let mut bookmarks = self.bookmarks()?;
        let before = bookmarks.len();
        bookmarks.retain(|b| !b.is_for(&bookmark.topic_slug, &bookmark.section_slug));

        let bookmarked = bookmarks.len() == before;
        if bookmarked {
            bookmarks.push(bookmark);
        }

        self.cache.write(BOOKMARKS_KEY, &bookmarks)?;
        Ok(bookmarked)
    }

    /// 清除所有客户端状态（退出登录）
    pub fn reset(&self) -> StorageResult<()> {
        self.cache.invalidate_all(&[
            ONBOARDING_COMPLETE_KEY.to_string(),
            LEARNING_PATH_KEY.to_string(),
            EXPERIENCE_LEVEL_KEY.to_string(),
            STREAK_KEY.to_string(),
            BOOKMARKS_KEY.to_string(),
        ])
    }
}
