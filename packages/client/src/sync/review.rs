use std::sync::Arc;

use chrono::{DateTime, Utc};
use pathwise_algo::review::validate_quality;
use pathwise_algo::{due_items, ReviewState};
use tracing::{debug, info};

use super::{Revalidated, SyncEngine, SyncResult};
use crate::api::{CurriculumApi, DueReview, UpdateReviewRequest};
use crate::storage::keys;
use crate::storage::{LocalCache, StorageResult};

impl<A, C> SyncEngine<A, C>
where
    A: CurriculumApi,
    C: LocalCache + ?Sized,
{
    /// 提交一次复习评分
    ///
    /// 评分在本地校验，不合法时不会发出请求。成功后失效复习队列与全局进度。
    pub async fn submit_review(
        &self,
        topic_slug: &str,
        section_slug: &str,
        quality: u8,
    ) -> SyncResult<ReviewState> {
        let quality = validate_quality(quality)?;

        let request = UpdateReviewRequest {
            topic_slug: topic_slug.to_string(),
            section_slug: section_slug.to_string(),
            quality,
        };
        let request_id = format!("review:update:{}:{}:{}", topic_slug, section_slug, quality);

        let api = Arc::clone(&self.api);
        let state = self
            .gateway
            .execute(&request_id, move || {
                let api = Arc::clone(&api);
                let request = request.clone();
                async move { api.update_review(request).await }
            })
            .await?;

        self.invalidate_keys(&keys::review_affected_keys())?;
        info!(
            topic_slug,
            section_slug,
            quality,
            interval = state.interval,
            "review recorded"
        );
        Ok(state)
    }

    /// 本地预览评分后的下一次复习状态，不写入任何地方
    pub fn preview_review(
        &self,
        current: &ReviewState,
        quality: u8,
        now: DateTime<Utc>,
    ) -> SyncResult<ReviewState> {
        Ok(current.review(quality, now)?)
    }

    pub fn peek_due_reviews(&self) -> StorageResult<Option<Vec<DueReview>>> {
        self.peek(keys::due_reviews_key())
    }

    pub async fn load_due_reviews(&self) -> Revalidated<Vec<DueReview>> {
        let api = Arc::clone(&self.api);
        self.revalidate(keys::due_reviews_key().to_string(), move || {
            let api = Arc::clone(&api);
            async move { api.fetch_due_reviews().await }
        })
        .await
    }

    /// 缓存中已到期的复习，按到期时间升序
    pub fn review_queue(&self, now: DateTime<Utc>) -> StorageResult<Vec<DueReview>> {
        let reviews = self.peek_due_reviews()?.unwrap_or_default();
        let queue = due_items(reviews, now);
        debug!(due = queue.len(), "review queue built");
        Ok(queue)
    }
}
