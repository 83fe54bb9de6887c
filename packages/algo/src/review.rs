//! 间隔重复调度 (SM-2)
//!
//! 根据用户给出的回忆质量评分 (1-5) 计算下一次复习时间、间隔与难度因子。
//! 纯函数：相同的 `(quality, interval, ease_factor, review_count, now)` 总是得到相同结果。

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::types::{
    ReviewState, ScheduleOutcome, FIRST_INTERVAL_DAYS, MAX_INTERVAL_DAYS, MAX_QUALITY,
    MIN_EASE_FACTOR, MIN_QUALITY, PASSING_QUALITY, SECOND_INTERVAL_DAYS,
};

/// 调度输入校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("质量评分必须在 1-5 之间，实际为 {0}")]
    InvalidQuality(u8),

    #[error("难度因子必须是有限数值，实际为 {0}")]
    InvalidEaseFactor(f64),
}

/// Validates a quality rating without clamping.
pub fn validate_quality(quality: u8) -> Result<u8, ReviewError> {
    if (MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        Ok(quality)
    } else {
        Err(ReviewError::InvalidQuality(quality))
    }
}

/// SM-2 ease factor update, floored at [`MIN_EASE_FACTOR`].
pub fn next_ease_factor(quality: u8, ease_factor: f64) -> f64 {
    let miss = f64::from(MAX_QUALITY - quality);
    let delta = 0.1 - miss * (0.08 + miss * 0.02);
    (ease_factor + delta).max(MIN_EASE_FACTOR)
}

/// 计算下一次复习
///
/// - `quality < 3` 视为遗忘：间隔重置为 1 天，复习次数归零
/// - 否则按已复习次数推进：第一次 1 天，第二次 6 天，之后 `round(interval × newEF)`
/// - 间隔不超过 [`MAX_INTERVAL_DAYS`]
///
/// `review_count` 是本次复习之前的次数。
pub fn schedule(
    quality: u8,
    interval: u32,
    ease_factor: f64,
    review_count: u32,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome, ReviewError> {
    let quality = validate_quality(quality)?;
    if !ease_factor.is_finite() {
        return Err(ReviewError::InvalidEaseFactor(ease_factor));
    }

    let ease_factor = next_ease_factor(quality, ease_factor);

    let (interval, review_count) = if quality < PASSING_QUALITY {
        (FIRST_INTERVAL_DAYS, 0)
    } else {
        let next = match review_count {
            0 => FIRST_INTERVAL_DAYS,
            1 => SECOND_INTERVAL_DAYS,
            // 间隔至少 1 天，保证 next_review_at 严格前移
            _ => scaled_interval(interval, ease_factor),
        };
        (next, review_count.saturating_add(1))
    };

    Ok(ScheduleOutcome {
        next_review_at: now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        interval,
        ease_factor,
        review_count,
    })
}

fn scaled_interval(interval: u32, ease_factor: f64) -> u32 {
    let scaled = (f64::from(interval) * ease_factor).round();
    if scaled >= f64::from(MAX_INTERVAL_DAYS) {
        MAX_INTERVAL_DAYS
    } else {
        (scaled as u32).max(FIRST_INTERVAL_DAYS)
    }
}

impl ReviewState {
    /// Applies one review and returns the superseding state.
    pub fn review(&self, quality: u8, now: DateTime<Utc>) -> Result<ReviewState, ReviewError> {
        let outcome = schedule(
            quality,
            self.interval,
            self.ease_factor,
            self.review_count,
            now,
        )?;

        Ok(ReviewState {
            item_id: self.item_id.clone(),
            interval: outcome.interval,
            ease_factor: outcome.ease_factor,
            review_count: outcome.review_count,
            next_review_at: outcome.next_review_at,
        })
    }
}

/// Anything that carries a next-review timestamp.
pub trait Scheduled {
    fn next_review_at(&self) -> DateTime<Utc>;
}

impl Scheduled for ReviewState {
    fn next_review_at(&self) -> DateTime<Utc> {
        self.next_review_at
    }
}

impl<T: Scheduled> Scheduled for &T {
    fn next_review_at(&self) -> DateTime<Utc> {
        (**self).next_review_at()
    }
}

pub fn is_due(next_review_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    next_review_at <= now
}

/// 复习队列：筛出已到期条目，按 next_review_at 升序（稳定排序）
pub fn due_items<T: Scheduled>(items: impl IntoIterator<Item = T>, now: DateTime<Utc>) -> Vec<T> {
    let mut due: Vec<T> = items
        .into_iter()
        .filter(|item| is_due(item.next_review_at(), now))
        .collect();
    due.sort_by_key(|item| item.next_review_at());
    due
}
