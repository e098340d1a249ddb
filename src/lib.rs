//! Topic engagement dashboards for the social media analyser API.
//!
//! Rows fetched for an applied filter are split into rest-of-India and
//! Karnataka, summed per dimension and ranked into the series each topic
//! dashboard charts.

pub mod aggregate;
pub mod api;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod services;
pub mod state;
pub mod types;
pub mod view_model;

pub use aggregate::{HourPoint, NamedSeries, SeriesPoint};
pub use error::FetchError;
pub use filters::{FilterPatch, FilterState};
pub use services::dashboard::{DashboardSession, DashboardSnapshot};
pub use types::{DashboardFilters, Mode, Row, Topic};
pub use view_model::{derive_view, TopicView};
