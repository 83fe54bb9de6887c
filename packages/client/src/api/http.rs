//! 基于 reqwest 的 REST 客户端

use std::time::Duration;

use pathwise_algo::{Node, ReviewState};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use super::models::{
    CategoryAggregate, DueReview, DueReviewsResponse, ExperienceLevel, ToggleCategoryRequest,
    ToggleSectionRequest, TopicAggregate, TopicsResponse, UpdateReviewRequest,
};
use super::CurriculumApi;
use crate::config::ClientConfig;
use crate::gateway::{RequestError, RequestResult};

/// reqwest 实现
#[derive(Clone, Debug)]
pub struct HttpCurriculumApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCurriculumApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    /// 附带 Bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> RequestResult<T> {
        debug!(path, "GET");
        let response = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        decode(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> RequestResult<T> {
        debug!(path, "POST");
        let response = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(path, response).await
    }

    /// POST，只关心状态码
    async fn post_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestResult<()> {
        debug!(path, "POST");
        let response = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await.map(|_| ())
    }
}

fn transport_error(err: reqwest::Error) -> RequestError {
    if err.is_decode() {
        RequestError::Decode(err.to_string())
    } else {
        RequestError::Network(err.to_string())
    }
}

async fn ensure_success(response: Response) -> RequestResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RequestError::from_status(status.as_u16(), body))
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> RequestResult<T> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        error!(path, error = %e, "failed to parse response JSON");
        RequestError::Decode(e.to_string())
    })
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl CurriculumApi for HttpCurriculumApi {
    async fn fetch_topics(&self, level: ExperienceLevel) -> RequestResult<Vec<Node>> {
        let response: TopicsResponse = self
            .get_json(
                "/curriculum/topics",
                &[("experienceLevel", level.as_str())],
            )
            .await?;
        Ok(response.topics)
    }

    async fn fetch_topic_aggregate(
        &self,
        slug: &str,
        level: ExperienceLevel,
    ) -> RequestResult<TopicAggregate> {
        let path = format!("/curriculum/aggregate/topic/{}", segment(slug));
        self.get_json(&path, &[("experienceLevel", level.as_str())])
            .await
    }

    async fn fetch_category_aggregate(
        &self,
        topic_slug: &str,
        category_slug: &str,
    ) -> RequestResult<CategoryAggregate> {
        let path = format!(
            "/curriculum/aggregate/category/{}/{}",
            segment(topic_slug),
            segment(category_slug)
        );
        self.get_json(&path, &[]).await
    }

    async fn toggle_section(&self, request: ToggleSectionRequest) -> RequestResult<()> {
        self.post_ack("/progress/toggle", &request).await
    }

    async fn toggle_category(&self, request: ToggleCategoryRequest) -> RequestResult<()> {
        self.post_ack("/progress/toggle/category", &request).await
    }

    async fn fetch_due_reviews(&self) -> RequestResult<Vec<DueReview>> {
        let response: DueReviewsResponse = self.get_json("/progress/reviews/due", &[]).await?;
        Ok(response.reviews)
    }

    async fn update_review(&self, request: UpdateReviewRequest) -> RequestResult<ReviewState> {
        let mut state: ReviewState = self
            .post_json("/progress/reviews/update", &request)
            .await?;
        if state.item_id.is_empty() {
            state.item_id = request.item_id();
        }
        Ok(state)
    }
}
