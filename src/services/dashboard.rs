// Dashboard session service.
// Owns the filter pair, the fetch lifecycle and the derived view for one topic page.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::DashboardSource;
use crate::error::{FetchError, FetchFailure};
use crate::fetch::{FetchController, FetchStatus, FetchTicket, Resolution};
use crate::filters::{FilterPatch, FilterState};
use crate::types::{
    AiChatRequest, AiChatResponse, AiInsightsRequest, AiInsightsResponse, DashboardFilters,
    MetricsHealth, Topic,
};
use crate::view_model::{derive_view, ChartPanel, TopicView};

/// Header figures shown above the charts.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardHeader {
    pub total_rows: usize,
    pub time_range: String,
    pub metrics_health: Option<MetricsHealth>,
    pub llm_insights: Option<String>,
}

/// Session state as seen by a consumer.
#[derive(Debug, Clone, serde::Serialize)]
#[allow(clippy::large_enum_variant)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DashboardSnapshot {
    Idle {
        filters: DashboardFilters,
    },
    Loading {
        filters: DashboardFilters,
    },
    Success {
        filters: DashboardFilters,
        header: DashboardHeader,
        view: TopicView,
        panels: Vec<ChartPanel>,
    },
    Error {
        filters: DashboardFilters,
        error: FetchFailure,
    },
}

struct SessionInner {
    filters: FilterState,
    fetch: FetchController,
    view: Option<TopicView>,
}

/// One topic page: filters, fetches and the view built from the latest response.
///
/// The lock is never held across an `.await`, so overlapping applies are fine:
/// whichever request was started last decides what the session shows.
pub struct DashboardSession {
    source: Arc<dyn DashboardSource>,
    inner: Mutex<SessionInner>,
}

impl DashboardSession {
    pub fn new(source: Arc<dyn DashboardSource>, topic: Topic) -> Self {
        Self::with_filters(source, DashboardFilters::today(topic))
    }

    pub fn with_filters(source: Arc<dyn DashboardSource>, defaults: DashboardFilters) -> Self {
        Self {
            source,
            inner: Mutex::new(SessionInner {
                filters: FilterState::with_defaults(defaults),
                fetch: FetchController::new(),
                view: None,
            }),
        }
    }

    pub fn topic(&self) -> Topic {
        self.inner.lock().filters.topic().clone()
    }

    pub fn draft(&self) -> DashboardFilters {
        self.inner.lock().filters.draft().clone()
    }

    pub fn applied(&self) -> DashboardFilters {
        self.inner.lock().filters.applied().clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.inner.lock().fetch.status()
    }

    pub fn view(&self) -> Option<TopicView> {
        self.inner.lock().view.clone()
    }

    pub fn set_draft(&self, patch: FilterPatch) {
        self.inner.lock().filters.set_draft(patch);
    }

    /// Commit the draft and fetch for it.
    pub async fn apply(&self) -> Resolution {
        let ticket = {
            let mut inner = self.inner.lock();
            let filters = inner.filters.apply();
            inner.fetch.begin(filters)
        };
        self.run_fetch(ticket).await
    }

    /// Fetch for the current applied filter (initial load).
    pub async fn refresh(&self) -> Resolution {
        let ticket = {
            let mut inner = self.inner.lock();
            let filters = inner.filters.applied().clone();
            inner.fetch.begin(filters)
        };
        self.run_fetch(ticket).await
    }

    /// Move the page to another topic with default filters and fetch.
    pub async fn switch_topic(&self, topic: Topic) -> Resolution {
        let ticket = {
            let mut inner = self.inner.lock();
            inner.filters.reset(DashboardFilters::today(topic));
            inner.view = None;
            let filters = inner.filters.applied().clone();
            inner.fetch.begin(filters)
        };
        self.run_fetch(ticket).await
    }

    /// Await the source for a ticket issued under the same lock that committed its filter.
    async fn run_fetch(&self, ticket: FetchTicket) -> Resolution {
        log::info!(
            "Dashboard fetch #{} started: topic={} {}..{} hours {}-{} mode={}",
            ticket.token,
            ticket.filters.topic,
            ticket.filters.from_date,
            ticket.filters.to_date,
            ticket.filters.start_hour,
            ticket.filters.end_hour,
            ticket.filters.mode
        );

        let result = self.source.fetch_dashboard(&ticket.filters).await;

        let mut inner = self.inner.lock();
        let resolution = inner.fetch.resolve(&ticket, result);
        if resolution == Resolution::Committed && inner.fetch.status() == FetchStatus::Success {
            // The page topic drives the view, not the topic echoed by the server.
            let view = inner
                .fetch
                .response()
                .map(|resp| derive_view(&ticket.filters.topic, &resp.rows));
            inner.view = view;
        }
        resolution
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let inner = self.inner.lock();
        let filters = inner
            .fetch
            .in_flight()
            .cloned()
            .unwrap_or_else(|| inner.filters.applied().clone());

        match inner.fetch.status() {
            FetchStatus::Idle => DashboardSnapshot::Idle { filters },
            FetchStatus::Loading => DashboardSnapshot::Loading { filters },
            FetchStatus::Error => match inner.fetch.error() {
                Some(err) => DashboardSnapshot::Error {
                    filters,
                    error: FetchFailure::from(err),
                },
                None => DashboardSnapshot::Loading { filters },
            },
            FetchStatus::Success => match (inner.fetch.response(), inner.view.as_ref()) {
                (Some(resp), Some(view)) => DashboardSnapshot::Success {
                    header: DashboardHeader {
                        total_rows: resp.rows.len(),
                        time_range: filters.time_range_label(),
                        metrics_health: resp.summary.metrics_health.clone(),
                        llm_insights: resp.summary.llm_insights.clone(),
                    },
                    panels: view.panels(),
                    view: view.clone(),
                    filters,
                },
                _ => DashboardSnapshot::Loading { filters },
            },
        }
    }

    /// AI insights for the applied filter window.
    pub async fn insights(&self) -> Result<AiInsightsResponse, FetchError> {
        let request = AiInsightsRequest::from(&self.applied());
        self.source.fetch_insights(&request).await
    }

    /// Ask a question about the applied filter window.
    pub async fn ask(&self, question: &str) -> Result<AiChatResponse, FetchError> {
        let request = AiChatRequest::new(&self.applied(), question);
        self.source.chat(&request).await
    }
}
