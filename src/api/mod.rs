//! Analytics API integration.
//!
//! `DashboardSource` is the seam between the fetch lifecycle and the network:
//! `AnalyticsClient` implements it over HTTP, tests implement it in memory.

pub mod client;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{
    AiChatRequest, AiChatResponse, AiInsightsRequest, AiInsightsResponse, DashboardFilters,
    DashboardResponse,
};

#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Fetch rows and summary for one filter window.
    async fn fetch_dashboard(&self, filters: &DashboardFilters)
        -> Result<DashboardResponse, FetchError>;

    async fn fetch_insights(&self, request: &AiInsightsRequest)
        -> Result<AiInsightsResponse, FetchError>;

    async fn chat(&self, request: &AiChatRequest) -> Result<AiChatResponse, FetchError>;
}

pub use client::AnalyticsClient;
