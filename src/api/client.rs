//! HTTP client for the social media analyser API.
//!
//! Uses reqwest with JSON bodies. All endpoints hang off the configured base
//! URL: `GET /api/dashboard`, `POST /api/ai/insights`, `POST /api/ai/chat`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::DashboardSource;
use crate::error::FetchError;
use crate::types::{
    AiChatRequest, AiChatResponse, AiInsightsRequest, AiInsightsResponse, Config,
    DashboardFilters, DashboardResponse,
};

const DASHBOARD_PATH: &str = "/api/dashboard";
const INSIGHTS_PATH: &str = "/api/ai/insights";
const CHAT_PATH: &str = "/api/ai/chat";

pub struct AnalyticsClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnalyticsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| format!("Invalid API base URL '{}': {}", base_url, e))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, String> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| FetchError::Network(format!("Invalid endpoint URL: {}", e)))
    }

    /// Dashboard URL with the full filter encoded as query parameters.
    pub fn dashboard_url(&self, filters: &DashboardFilters) -> Result<Url, FetchError> {
        let mut url = self.endpoint(DASHBOARD_PATH)?;
        url.query_pairs_mut()
            .append_pair("topic", filters.topic.as_str())
            .append_pair("fromDate", &filters.from_date.format("%Y-%m-%d").to_string())
            .append_pair("toDate", &filters.to_date.format("%Y-%m-%d").to_string())
            .append_pair("startHour", &filters.start_hour.to_string())
            .append_pair("endHour", &filters.end_hour.to_string())
            .append_pair("mode", filters.mode.as_str());
        Ok(url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let resp = self.client.post(url).json(body).send().await?;
        handle_response(resp).await
    }
}

/// Turn a response into `T`, or into an error carrying the body / status text.
async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(FetchError::http(
            status.as_u16(),
            &text,
            status.canonical_reason().unwrap_or(""),
        ));
    }

    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(FetchError::from)
}

#[async_trait]
impl DashboardSource for AnalyticsClient {
    async fn fetch_dashboard(
        &self,
        filters: &DashboardFilters,
    ) -> Result<DashboardResponse, FetchError> {
        let url = self.dashboard_url(filters)?;
        log::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        handle_response(resp).await
    }

    async fn fetch_insights(
        &self,
        request: &AiInsightsRequest,
    ) -> Result<AiInsightsResponse, FetchError> {
        self.post_json(INSIGHTS_PATH, request).await
    }

    async fn chat(&self, request: &AiChatRequest) -> Result<AiChatResponse, FetchError> {
        self.post_json(CHAT_PATH, request).await
    }
}
