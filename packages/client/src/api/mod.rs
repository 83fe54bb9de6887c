//! 课程服务端接口
//!
//! `CurriculumApi` 描述同步层依赖的 REST 端点；生产环境使用
//! [`HttpCurriculumApi`]，测试中替换为内存实现。
//! 实现只负责单次请求，重试与去重由网关完成。

pub mod http;
pub mod models;

pub use http::HttpCurriculumApi;
pub use models::{
    CategoryAggregate, CategoryInfo, DueReview, ExperienceLevel, ProgressMap, Section,
    ToggleCategoryRequest, ToggleSectionRequest, TopicAggregate, TopicInfo, TopicStats,
    UpdateReviewRequest,
};

use std::future::Future;

use pathwise_algo::{Node, ReviewState};

use crate::gateway::RequestResult;

pub trait CurriculumApi: Send + Sync + 'static {
    /// `GET /curriculum/topics?experienceLevel=`
    fn fetch_topics(
        &self,
        level: ExperienceLevel,
    ) -> impl Future<Output = RequestResult<Vec<Node>>> + Send;

    /// `GET /curriculum/aggregate/topic/{slug}?experienceLevel=`
    fn fetch_topic_aggregate(
        &self,
        slug: &str,
        level: ExperienceLevel,
    ) -> impl Future<Output = RequestResult<TopicAggregate>> + Send;

    /// `GET /curriculum/aggregate/category/{topicSlug}/{categorySlug}`
    fn fetch_category_aggregate(
        &self,
        topic_slug: &str,
        category_slug: &str,
    ) -> impl Future<Output = RequestResult<CategoryAggregate>> + Send;

    /// `POST /progress/toggle`
    fn toggle_section(
        &self,
        request: ToggleSectionRequest,
    ) -> impl Future<Output = RequestResult<()>> + Send;

    /// `POST /progress/toggle/category`
    fn toggle_category(
        &self,
        request: ToggleCategoryRequest,
    ) -> impl Future<Output = RequestResult<()>> + Send;

    /// `GET /progress/reviews/due`
    fn fetch_due_reviews(&self) -> impl Future<Output = RequestResult<Vec<DueReview>>> + Send;

    /// `POST /progress/reviews/update`，返回服务端保存后的复习状态
    fn update_review(
        &self,
        request: UpdateReviewRequest,
    ) -> impl Future<Output = RequestResult<ReviewState>> + Send;
}
