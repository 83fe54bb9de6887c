use std::sync::Arc;

use pathwise_algo::Node;
use tracing::debug;

use super::{Revalidated, SyncEngine, SyncResult};
use crate::api::{CategoryAggregate, CurriculumApi, ExperienceLevel, TopicAggregate};
use crate::storage::keys;
use crate::storage::{LocalCache, StorageResult};

impl<A, C> SyncEngine<A, C>
where
    A: CurriculumApi,
    C: LocalCache + ?Sized,
{
    // ========== 目录 ==========

    pub fn peek_topics(&self, level: ExperienceLevel) -> StorageResult<Option<Vec<Node>>> {
        self.peek(&keys::topics_key(level))
    }

    pub async fn load_topics(&self, level: ExperienceLevel) -> Revalidated<Vec<Node>> {
        let api = Arc::clone(&self.api);
        self.revalidate(keys::topics_key(level), move || {
            let api = Arc::clone(&api);
            async move { api.fetch_topics(level).await }
        })
        .await
    }

    // ========== 话题聚合 ==========

    pub fn peek_topic(
        &self,
        slug: &str,
        level: ExperienceLevel,
    ) -> StorageResult<Option<TopicAggregate>> {
        self.peek(&keys::topic_key(slug, level))
    }

    pub async fn load_topic(&self, slug: &str, level: ExperienceLevel) -> Revalidated<TopicAggregate> {
        let api = Arc::clone(&self.api);
        let slug = slug.to_string();
        self.revalidate(keys::topic_key(&slug, level), move || {
            let api = Arc::clone(&api);
            let slug = slug.clone();
            async move { api.fetch_topic_aggregate(&slug, level).await }
        })
        .await
    }

    // ========== 分类聚合 ==========

    pub fn peek_category(
        &self,
        topic_slug: &str,
        category_slug: &str,
    ) -> StorageResult<Option<CategoryAggregate>> {
        self.peek(&keys::category_key(topic_slug, category_slug))
    }

    pub async fn load_category(
        &self,
        topic_slug: &str,
        category_slug: &str,
    ) -> Revalidated<CategoryAggregate> {
        let api = Arc::clone(&self.api);
        let topic = topic_slug.to_string();
        let category = category_slug.to_string();
        self.revalidate(keys::category_key(&topic, &category), move || {
            let api = Arc::clone(&api);
            let (topic, category) = (topic.clone(), category.clone());
            async move { api.fetch_category_aggregate(&topic, &category).await }
        })
        .await
    }

    // ========== 个性化路径 ==========

    /// 拉取（并缓存）目录后生成学习路径
    ///
    /// `goal_id` 缺省或无法识别时返回按依赖排序的完整目录。
    pub async fn personalized_path(
        &self,
        level: ExperienceLevel,
        goal_id: Option<&str>,
    ) -> SyncResult<Vec<Node>> {
        let catalog = self.load_topics(level).await.into_fresh()?;
        let path = self.scheduler.generate_path_for_id(&catalog, goal_id);
        debug!(%level, goal_id, nodes = path.len(), "personalized path generated");
        Ok(path)
    }

    /// 只用缓存中的目录生成路径，目录未缓存时返回 `None`
    pub fn cached_path(
        &self,
        level: ExperienceLevel,
        goal_id: Option<&str>,
    ) -> StorageResult<Option<Vec<Node>>> {
        Ok(self
            .peek_topics(level)?
            .map(|catalog| self.scheduler.generate_path_for_id(&catalog, goal_id)))
    }
}
