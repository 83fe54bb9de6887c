//! 乐观进度更新
//!
//! 流程是显式的补偿分支：快照 → 应用 → 失效缓存 → 网关请求 → 失败时恢复快照。

use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::{SyncEngine, SyncResult};
use crate::api::{CurriculumApi, ProgressMap, ToggleCategoryRequest, ToggleSectionRequest};
use crate::gateway::RequestResult;
use crate::storage::keys;
use crate::storage::LocalCache;

/// 页面持有的内存进度表（小节 slug → 是否完成）
///
/// `Clone` 共享同一张表。
#[derive(Clone, Debug, Default)]
pub struct ProgressState {
    inner: Arc<RwLock<ProgressMap>>,
}

/// 修改前的值；`None` 表示原来没有记录
type Snapshot = Vec<(String, Option<bool>)>;

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(progress: ProgressMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(progress)),
        }
    }

    pub fn get(&self, section_slug: &str) -> Option<bool> {
        self.inner.read().get(section_slug).copied()
    }

    pub fn is_completed(&self, section_slug: &str) -> bool {
        self.get(section_slug).unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.inner.read().values().filter(|done| **done).count()
    }

    pub fn to_map(&self) -> ProgressMap {
        self.inner.read().clone()
    }

    /// 用服务端返回的进度整体替换
    pub fn replace(&self, progress: ProgressMap) {
        *self.inner.write() = progress;
    }

    fn snapshot(&self, sections: &[String]) -> Snapshot {
        let progress = self.inner.read();
        sections
            .iter()
            .map(|slug| (slug.clone(), progress.get(slug).copied()))
            .collect()
    }

    fn apply(&self, sections: &[String], completed: bool) {
        let mut progress = self.inner.write();
        for slug in sections {
            progress.insert(slug.clone(), completed);
        }
    }

    /// 恢复快照
    ///
    /// 只恢复仍是本次写入值的小节；之后被其它操作改过的小节保持不变。
    fn restore(&self, snapshot: Snapshot, applied: bool) {
        let mut progress = self.inner.write();
        for (slug, previous) in snapshot {
            if progress.get(&slug) != Some(&applied) {
                continue;
            }
            match previous {
                Some(value) => {
                    progress.insert(slug, value);
                }
                None => {
                    progress.remove(&slug);
                }
            }
        }
    }
}

impl<A, C> SyncEngine<A, C>
where
    A: CurriculumApi,
    C: LocalCache + ?Sized,
{
    /// 标记单个小节完成 / 未完成
    pub async fn toggle_section(
        &self,
        state: &ProgressState,
        topic_slug: &str,
        category_slug: &str,
        section_slug: &str,
        completed: bool,
    ) -> SyncResult<()> {
        let request = ToggleSectionRequest {
            topic_slug: topic_slug.to_string(),
            section_slug: section_slug.to_string(),
            completed,
        };
        let request_id =
            self.mutation_id(&format!("progress:toggle:{}:{}", topic_slug, section_slug));

        let api = Arc::clone(&self.api);
        self.update_progress(
            state,
            topic_slug,
            category_slug,
            &[section_slug.to_string()],
            completed,
            &request_id,
            move || {
                let api = Arc::clone(&api);
                let request = request.clone();
                async move { api.toggle_section(request).await }
            },
        )
        .await
    }

    /// 整个分类一起标记，`sections` 为该分类下全部小节
    pub async fn toggle_category(
        &self,
        state: &ProgressState,
        topic_slug: &str,
        category_slug: &str,
        sections: &[String],
        completed: bool,
    ) -> SyncResult<()> {
        let request = ToggleCategoryRequest {
            topic_slug: topic_slug.to_string(),
            category_slug: category_slug.to_string(),
            completed,
        };
        let request_id = self.mutation_id(&format!(
            "progress:toggle-category:{}:{}",
            topic_slug, category_slug
        ));

        let api = Arc::clone(&self.api);
        self.update_progress(
            state,
            topic_slug,
            category_slug,
            sections,
            completed,
            &request_id,
            move || {
                let api = Arc::clone(&api);
                let request = request.clone();
                async move { api.toggle_category(request).await }
            },
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn update_progress<F, Fut>(
        &self,
        state: &ProgressState,
        topic_slug: &str,
        category_slug: &str,
        sections: &[String],
        completed: bool,
        request_id: &str,
        op: F,
    ) -> SyncResult<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<()>> + Send + 'static,
    {
        let affected = keys::progress_affected_keys(topic_slug, category_slug);

        // 1. 快照 + 乐观更新
        let snapshot = state.snapshot(sections);
        state.apply(sections, completed);

        // 2. 失效所有包含该进度的聚合
        if let Err(err) = self.invalidate_keys(&affected) {
            state.restore(snapshot, completed);
            warn!(topic_slug, category_slug, error = %err, "cache invalidation failed, progress rolled back");
            return Err(err.into());
        }

        // 3. 远端写入；失败时恢复快照
        match self.gateway.execute(request_id, op).await {
            Ok(()) => {
                debug!(topic_slug, category_slug, sections = sections.len(), completed, "progress saved");
                // 请求期间可能有拉取写回了旧聚合
                self.invalidate_keys(&affected)?;
                Ok(())
            }
            Err(err) => {
                state.restore(snapshot, completed);
                warn!(topic_slug, category_slug, error = %err, "progress update failed, rolled back");
                Err(err.into())
            }
        }
    }
}
