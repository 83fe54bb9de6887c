//! 集成测试公共夹具：可编程的内存 API

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use pathwise_algo::{Node, ReviewState};
use pathwise_client::api::{
    CategoryAggregate, CategoryInfo, CurriculumApi, DueReview, ExperienceLevel, ProgressMap,
    Section, ToggleCategoryRequest, ToggleSectionRequest, TopicAggregate, TopicInfo, TopicStats,
    UpdateReviewRequest,
};
use pathwise_client::gateway::{RequestError, RequestResult};
use pathwise_client::{LocalCache, MemoryCache, RequestGateway, RetryPolicy, SyncEngine};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn server_error() -> RequestError {
    RequestError::Server {
        status: 503,
        message: "unavailable".to_string(),
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub topics: Mutex<Vec<Node>>,
    pub topic: Mutex<Option<TopicAggregate>>,
    pub category: Mutex<Option<CategoryAggregate>>,
    pub due: Mutex<Vec<DueReview>>,

    /// 读请求返回的错误
    pub fetch_error: Mutex<Option<RequestError>>,
    /// 写请求返回的错误
    pub write_error: Mutex<Option<RequestError>>,
    /// 每次调用前等待
    pub latency: Mutex<Duration>,

    pub calls: Mutex<HashMap<&'static str, usize>>,
    pub section_writes: Mutex<Vec<ToggleSectionRequest>>,
    pub category_writes: Mutex<Vec<ToggleCategoryRequest>>,
    pub review_writes: Mutex<Vec<UpdateReviewRequest>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().get(name).copied().unwrap_or(0)
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn fail_fetches(&self, error: Option<RequestError>) {
        *self.fetch_error.lock() = error;
    }

    pub fn fail_writes(&self, error: Option<RequestError>) {
        *self.write_error.lock() = error;
    }

    async fn enter(&self, name: &'static str) {
        *self.calls.lock().entry(name).or_insert(0) += 1;
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn fetch<T: Clone>(&self, value: &Mutex<Option<T>>) -> RequestResult<T> {
        if let Some(err) = self.fetch_error.lock().clone() {
            return Err(err);
        }
        value
            .lock()
            .clone()
            .ok_or_else(|| RequestError::from_status(404, "not found"))
    }

    fn write(&self) -> RequestResult<()> {
        match self.write_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl CurriculumApi for FakeApi {
    async fn fetch_topics(&self, _level: ExperienceLevel) -> RequestResult<Vec<Node>> {
        self.enter("fetch_topics").await;
        if let Some(err) = self.fetch_error.lock().clone() {
            return Err(err);
        }
        Ok(self.topics.lock().clone())
    }

    async fn fetch_topic_aggregate(
        &self,
        _slug: &str,
        _level: ExperienceLevel,
    ) -> RequestResult<TopicAggregate> {
        self.enter("fetch_topic_aggregate").await;
        self.fetch(&self.topic)
    }

    async fn fetch_category_aggregate(
        &self,
        _topic_slug: &str,
        _category_slug: &str,
    ) -> RequestResult<CategoryAggregate> {
        self.enter("fetch_category_aggregate").await;
        self.fetch(&self.category)
    }

    async fn toggle_section(&self, request: ToggleSectionRequest) -> RequestResult<()> {
        self.enter("toggle_section").await;
        self.section_writes.lock().push(request);
        self.write()
    }

    async fn toggle_category(&self, request: ToggleCategoryRequest) -> RequestResult<()> {
        self.enter("toggle_category").await;
        self.category_writes.lock().push(request);
        self.write()
    }

    async fn fetch_due_reviews(&self) -> RequestResult<Vec<DueReview>> {
        self.enter("fetch_due_reviews").await;
        if let Some(err) = self.fetch_error.lock().clone() {
            return Err(err);
        }
        Ok(self.due.lock().clone())
    }

    async fn update_review(&self, request: UpdateReviewRequest) -> RequestResult<ReviewState> {
        self.enter("update_review").await;
        self.review_writes.lock().push(request.clone());
        self.write()?;
        let state = ReviewState::first_study(request.item_id(), now());
        state
            .review(request.quality, now())
            .map_err(|e| RequestError::Validation(e.to_string()))
    }
}

// ============================================================================
// 夹具数据
// ============================================================================

pub fn topic_info() -> TopicInfo {
    TopicInfo {
        slug: "react".to_string(),
        name: "React".to_string(),
        description: None,
    }
}

pub fn hooks_category(progress: &[(&str, bool)]) -> CategoryAggregate {
    CategoryAggregate {
        category: CategoryInfo {
            slug: "hooks".to_string(),
            name: "Hooks".to_string(),
            section_count: 2,
        },
        sections: vec![
            Section {
                slug: "use-state".to_string(),
                name: "useState".to_string(),
                category_slug: Some("hooks".to_string()),
            },
            Section {
                slug: "use-effect".to_string(),
                name: "useEffect".to_string(),
                category_slug: Some("hooks".to_string()),
            },
        ],
        progress: progress_map(progress),
        topic: topic_info(),
    }
}

pub fn react_topic(completed_sections: u32) -> TopicAggregate {
    TopicAggregate {
        topic: topic_info(),
        categories: vec![hooks_category(&[]).category],
        sections: hooks_category(&[]).sections,
        progress: ProgressMap::new(),
        stats: TopicStats {
            total_sections: 2,
            completed_sections,
        },
    }
}

pub fn progress_map(progress: &[(&str, bool)]) -> ProgressMap {
    progress
        .iter()
        .map(|(slug, done)| (slug.to_string(), *done))
        .collect()
}

pub fn catalog(slugs: &[&str]) -> Vec<Node> {
    slugs.iter().map(|s| Node::new(*s, s.to_uppercase())).collect()
}

pub fn due_review(item_id: &str, next_review_at: DateTime<Utc>) -> DueReview {
    let mut review_data = ReviewState::first_study(item_id, next_review_at);
    review_data.interval = 1;
    DueReview {
        item_id: item_id.to_string(),
        section_name: item_id.to_string(),
        review_data,
    }
}

/// 短退避的网关，测试里重试不需要等满 1 秒
pub fn fast_gateway() -> RequestGateway {
    RequestGateway::new(RetryPolicy::new(3, Duration::from_millis(10)))
}

pub fn engine(api: &Arc<FakeApi>) -> SyncEngine<FakeApi, MemoryCache> {
    SyncEngine::new(Arc::clone(api), Arc::new(MemoryCache::new()), fast_gateway())
}

pub fn engine_with_cache<C: LocalCache + ?Sized>(
    api: &Arc<FakeApi>,
    cache: Arc<C>,
) -> SyncEngine<FakeApi, C> {
    SyncEngine::new(Arc::clone(api), cache, fast_gateway())
}
