//! Fetch lifecycle for the applied filter.
//!
//! Every call to `begin` bumps a generation counter and hands out a ticket.
//! When a response comes back, only the ticket for the latest generation may
//! change state; anything older is dropped without a trace.

use serde::Serialize;

use crate::error::FetchError;
use crate::types::{DashboardFilters, DashboardResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// One outstanding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub token: u64,
    pub filters: DashboardFilters,
}

/// What happened to a resolved ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Committed,
    Stale,
}

#[derive(Debug, Clone)]
pub struct FetchController {
    generation: u64,
    status: FetchStatus,
    in_flight: Option<DashboardFilters>,
    response: Option<DashboardResponse>,
    error: Option<FetchError>,
}

impl Default for FetchController {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchController {
    pub fn new() -> Self {
        Self {
            generation: 0,
            status: FetchStatus::Idle,
            in_flight: None,
            response: None,
            error: None,
        }
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Filter of the most recently started request.
    pub fn in_flight(&self) -> Option<&DashboardFilters> {
        self.in_flight.as_ref()
    }

    /// Last committed response. Kept across later failures.
    pub fn response(&self) -> Option<&DashboardResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(FetchError::user_message)
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.generation
    }

    /// Enter `loading` for `filters`, superseding any request in flight.
    pub fn begin(&mut self, filters: DashboardFilters) -> FetchTicket {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.error = None;
        self.in_flight = Some(filters.clone());
        FetchTicket {
            token: self.generation,
            filters,
        }
    }

    /// Settle `ticket` with the collaborator's result.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<DashboardResponse, FetchError>,
    ) -> Resolution {
        if !self.is_current(ticket.token) {
            log::debug!(
                "Dropping stale dashboard response #{} (current #{})",
                ticket.token,
                self.generation
            );
            return Resolution::Stale;
        }

        match result {
            Ok(response) => {
                log::info!(
                    "Dashboard fetch #{} committed: topic={} rows={}",
                    ticket.token,
                    response.topic,
                    response.rows.len()
                );
                self.response = Some(response);
                self.error = None;
                self.status = FetchStatus::Success;
            }
            Err(e) => {
                log::warn!("Dashboard fetch #{} failed: {}", ticket.token, e);
                self.error = Some(e);
                self.status = FetchStatus::Error;
            }
        }
        Resolution::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DashboardSummary, Row, Topic};
    use chrono::NaiveDate;

    fn filters(start_hour: i32) -> DashboardFilters {
        let mut f = DashboardFilters::for_day(Topic::Sports, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        f.start_hour = start_hour;
        f
    }

    fn response(filters: &DashboardFilters, rows: usize) -> DashboardResponse {
        DashboardResponse {
            topic: filters.topic.clone(),
            filters: filters.clone(),
            summary: DashboardSummary::default(),
            rows: vec![Row::default(); rows],
        }
    }

    #[test]
    fn test_starts_idle() {
        let ctl = FetchController::new();
        assert_eq!(ctl.status(), FetchStatus::Idle);
        assert_eq!(ctl.generation(), 0);
        assert!(ctl.response().is_none());
    }

    #[test]
    fn test_success_commits_response() {
        let mut ctl = FetchController::new();
        let ticket = ctl.begin(filters(0));
        assert_eq!(ctl.status(), FetchStatus::Loading);

        let resolution = ctl.resolve(&ticket, Ok(response(&ticket.filters, 3)));
        assert_eq!(resolution, Resolution::Committed);
        assert_eq!(ctl.status(), FetchStatus::Success);
        assert_eq!(ctl.response().map(|r| r.rows.len()), Some(3));
    }

    #[test]
    fn test_error_records_message() {
        let mut ctl = FetchController::new();
        let ticket = ctl.begin(filters(0));
        ctl.resolve(&ticket, Err(FetchError::http(500, "", "Internal Server Error")));

        assert_eq!(ctl.status(), FetchStatus::Error);
        assert_eq!(
            ctl.error_message().as_deref(),
            Some("API error 500: Internal Server Error")
        );
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut ctl = FetchController::new();
        let first = ctl.begin(filters(1));
        let second = ctl.begin(filters(2));
        assert!(second.token > first.token);

        assert_eq!(
            ctl.resolve(&second, Ok(response(&second.filters, 2))),
            Resolution::Committed
        );
        assert_eq!(
            ctl.resolve(&first, Ok(response(&first.filters, 9))),
            Resolution::Stale
        );
        assert_eq!(ctl.response().map(|r| r.filters.start_hour), Some(2));
        assert_eq!(ctl.status(), FetchStatus::Success);
    }

    #[test]
    fn test_stale_error_is_silent() {
        let mut ctl = FetchController::new();
        let first = ctl.begin(filters(1));
        let _second = ctl.begin(filters(2));

        let resolution = ctl.resolve(&first, Err(FetchError::Network("reset".to_string())));
        assert_eq!(resolution, Resolution::Stale);
        assert_eq!(ctl.status(), FetchStatus::Loading);
        assert!(ctl.error().is_none());
    }

    #[test]
    fn test_new_cycle_clears_previous_error() {
        let mut ctl = FetchController::new();
        let first = ctl.begin(filters(1));
        ctl.resolve(&first, Err(FetchError::Network("down".to_string())));
        assert!(ctl.error().is_some());

        let second = ctl.begin(filters(2));
        assert!(ctl.error().is_none());
        ctl.resolve(&second, Ok(response(&second.filters, 1)));
        assert_eq!(ctl.status(), FetchStatus::Success);
        assert_eq!(ctl.in_flight().map(|f| f.start_hour), Some(2));
    }
}
