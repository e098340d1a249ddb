//! Topic view models: which ranked series each topic dashboard shows.
//!
//! Each topic has one builder in a dispatch table; cinema and any unrecognised
//! topic share the default builder.

use serde::Serialize;

use crate::aggregate::{
    hourly_engagement, split_regions, sum_by, top, travel_categories, HourPoint, NamedSeries,
    RegionSplit,
};
use crate::types::{Dimension, Row, Topic};

const STATE_LIMIT: usize = 7;
const LOCATION_LIMIT: usize = 10;
const KARNATAKA_CITY_LIMIT: usize = 10;
const POLITICIAN_LIMIT: usize = 6;
const SPORT_LIMIT: usize = 6;
const SPORT_STATE_LIMIT: usize = 8;
const SPORTS_PERSON_LIMIT: usize = 6;
const INDUSTRY_LIMIT: usize = 7;

pub const CINEMA_INDUSTRY_LABEL: &str = "Cinema Industries (India)";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelView {
    pub india_states: NamedSeries,
    pub india_locations: NamedSeries,
    pub travel_categories: NamedSeries,
    pub karnataka_cities: NamedSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliticsView {
    pub india_states: NamedSeries,
    pub india_locations: NamedSeries,
    pub india_politicians: NamedSeries,
    pub karnataka_politicians: NamedSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsView {
    pub india_sports: NamedSeries,
    pub india_state_sports: NamedSeries,
    pub india_sports_persons: NamedSeries,
    pub karnataka_sports: NamedSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultView {
    pub india_states: NamedSeries,
    pub india_locations: NamedSeries,
    pub india_dim: NamedSeries,
    pub india_dim_label: String,
    pub karnataka_hourly: Vec<HourPoint>,
}

/// Series bundle for one topic dashboard. Rebuilt wholesale per response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TopicView {
    Travel(TravelView),
    Politics(PoliticsView),
    Sports(SportsView),
    Default(DefaultView),
}

type ViewBuilder = fn(&RegionSplit<'_>) -> TopicView;

fn builder_for(topic: &Topic) -> ViewBuilder {
    match topic {
        Topic::Travel => build_travel,
        Topic::Politics => build_politics,
        Topic::Sports => build_sports,
        Topic::Cinema | Topic::Other(_) => build_default,
    }
}

/// Pick the view for `topic` from already split rows.
pub fn select_view(topic: &Topic, split: &RegionSplit<'_>) -> TopicView {
    builder_for(topic)(split)
}

/// Split rows by region and build the view for `topic`.
pub fn derive_view(topic: &Topic, rows: &[Row]) -> TopicView {
    let split = split_regions(rows);
    select_view(topic, &split)
}

fn india_states(split: &RegionSplit<'_>) -> NamedSeries {
    top(sum_by(split.india.iter().copied(), Dimension::State), STATE_LIMIT)
}

fn india_locations(split: &RegionSplit<'_>) -> NamedSeries {
    top(
        sum_by(split.india.iter().copied(), Dimension::Location),
        LOCATION_LIMIT,
    )
}

fn build_travel(split: &RegionSplit<'_>) -> TopicView {
    TopicView::Travel(TravelView {
        india_states: india_states(split),
        india_locations: india_locations(split),
        travel_categories: travel_categories(split.india.iter().copied()),
        karnataka_cities: top(
            sum_by(split.karnataka.iter().copied(), Dimension::Location),
            KARNATAKA_CITY_LIMIT,
        ),
    })
}

fn build_politics(split: &RegionSplit<'_>) -> TopicView {
    TopicView::Politics(PoliticsView {
        india_states: india_states(split),
        india_locations: india_locations(split),
        india_politicians: top(
            sum_by(split.india.iter().copied(), Dimension::Politician),
            POLITICIAN_LIMIT,
        ),
        karnataka_politicians: top(
            sum_by(split.karnataka.iter().copied(), Dimension::Politician),
            POLITICIAN_LIMIT,
        ),
    })
}

fn build_sports(split: &RegionSplit<'_>) -> TopicView {
    TopicView::Sports(SportsView {
        india_sports: top(
            sum_by(split.india.iter().copied(), Dimension::Sport),
            SPORT_LIMIT,
        ),
        india_state_sports: top(
            sum_by(split.india.iter().copied(), Dimension::State),
            SPORT_STATE_LIMIT,
        ),
        india_sports_persons: top(
            sum_by(split.india.iter().copied(), Dimension::SportsPerson),
            SPORTS_PERSON_LIMIT,
        ),
        karnataka_sports: top(
            sum_by(split.karnataka.iter().copied(), Dimension::Sport),
            SPORT_LIMIT,
        ),
    })
}

fn build_default(split: &RegionSplit<'_>) -> TopicView {
    TopicView::Default(DefaultView {
        india_states: india_states(split),
        india_locations: india_locations(split),
        india_dim: top(
            sum_by(split.india.iter().copied(), Dimension::Industry),
            INDUSTRY_LIMIT,
        ),
        india_dim_label: CINEMA_INDUSTRY_LABEL.to_string(),
        karnataka_hourly: hourly_engagement(split.karnataka.iter().copied()),
    })
}

// =============================================================================
// Chart panels
// =============================================================================

/// Data behind one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "lowercase")]
pub enum PanelSeries {
    Named(NamedSeries),
    Hourly(Vec<HourPoint>),
}

impl PanelSeries {
    pub fn is_empty(&self) -> bool {
        match self {
            PanelSeries::Named(s) => s.is_empty(),
            PanelSeries::Hourly(s) => s.is_empty(),
        }
    }
}

/// One dashboard chart: two India panels, then two topic panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPanel {
    pub id: &'static str,
    pub title: String,
    pub series: PanelSeries,
    /// Shown instead of the chart when the Karnataka panel has no data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl ChartPanel {
    fn new(id: &'static str, title: impl Into<String>, series: PanelSeries) -> Self {
        Self {
            id,
            title: title.into(),
            series,
            empty_message: None,
        }
    }

    fn karnataka(id: &'static str, title: &str, series: PanelSeries, empty: &'static str) -> Self {
        Self {
            empty_message: Some(empty),
            ..Self::new(id, title, series)
        }
    }

    /// The message to show when there is nothing to chart.
    pub fn placeholder(&self) -> Option<&'static str> {
        if self.series.is_empty() {
            self.empty_message
        } else {
            None
        }
    }
}

impl TopicView {
    /// Panels in display order.
    pub fn panels(&self) -> Vec<ChartPanel> {
        match self {
            TopicView::Travel(v) => vec![
                ChartPanel::new("db1", "India – State Trends", PanelSeries::Named(v.india_states.clone())),
                ChartPanel::new("db2", "India – Top Cities", PanelSeries::Named(v.india_locations.clone())),
                ChartPanel::new(
                    "db3",
                    "India – Travel / Holiday Preference Types",
                    PanelSeries::Named(v.travel_categories.clone()),
                ),
                ChartPanel::karnataka(
                    "db4",
                    "Karnataka – Top Cities (Travel & Holiday)",
                    PanelSeries::Named(v.karnataka_cities.clone()),
                    "No Karnataka travel data available for the selected filters.",
                ),
            ],
            TopicView::Politics(v) => vec![
                ChartPanel::new("db1", "India – State Trends", PanelSeries::Named(v.india_states.clone())),
                ChartPanel::new("db2", "India – Top Cities", PanelSeries::Named(v.india_locations.clone())),
                ChartPanel::new(
                    "db3",
                    "India – Politicians vs Engagement",
                    PanelSeries::Named(v.india_politicians.clone()),
                ),
                ChartPanel::karnataka(
                    "db4",
                    "Karnataka – Top Politicians by Engagement",
                    PanelSeries::Named(v.karnataka_politicians.clone()),
                    "No Karnataka political data available for the selected filters.",
                ),
            ],
            TopicView::Sports(v) => vec![
                ChartPanel::new(
                    "db1",
                    "India – Sports vs Engagement",
                    PanelSeries::Named(v.india_sports.clone()),
                ),
                ChartPanel::new(
                    "db2",
                    "India – States vs Engagement (Sports)",
                    PanelSeries::Named(v.india_state_sports.clone()),
                ),
                ChartPanel::new(
                    "db3",
                    "India – Sports Persons vs Engagement",
                    PanelSeries::Named(v.india_sports_persons.clone()),
                ),
                ChartPanel::karnataka(
                    "db4",
                    "Karnataka – Sports vs Engagement",
                    PanelSeries::Named(v.karnataka_sports.clone()),
                    "No Karnataka sports data available for the selected filters.",
                ),
            ],
            TopicView::Default(v) => vec![
                ChartPanel::new("db1", "India – State Trends", PanelSeries::Named(v.india_states.clone())),
                ChartPanel::new("db2", "India – Top Cities", PanelSeries::Named(v.india_locations.clone())),
                ChartPanel::new(
                    "db3",
                    format!("India – {}", v.india_dim_label),
                    PanelSeries::Named(v.india_dim.clone()),
                ),
                ChartPanel::karnataka(
                    "db4",
                    "Karnataka – Hourly Engagement",
                    PanelSeries::Hourly(v.karnataka_hourly.clone()),
                    "No Karnataka data available for the selected filters.",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SeriesPoint;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    fn point(name: &str, value: f64) -> SeriesPoint {
        SeriesPoint {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_sports_view_splits_regions() {
        let rows = rows(json!([
            { "State": "Karnataka", "Sport": "Cricket", "Engagement": 10, "Hour": 9 },
            { "State": "Karnataka", "Sport": "Cricket", "Engagement": 5, "Hour": 9 },
            { "State": "Kerala", "Sport": "Football", "Engagement": 20, "Hour": 14 }
        ]));

        let TopicView::Sports(view) = derive_view(&Topic::Sports, &rows) else {
            panic!("expected sports view");
        };
        assert_eq!(view.karnataka_sports, vec![point("Cricket", 15.0)]);
        assert_eq!(view.india_sports, vec![point("Football", 20.0)]);
        assert_eq!(view.india_state_sports, vec![point("Kerala", 20.0)]);
        assert!(view.india_sports_persons.is_empty());
    }

    #[test]
    fn test_travel_categories_drop_other_bucket() {
        let rows = rows(json!([
            { "State": "Goa", "Category": "Beach", "Engagement": 1 },
            { "State": "Goa", "Category": "Unknown", "Engagement": 1 },
            { "State": "Goa", "Category": "Food", "Engagement": 1 },
            { "State": "Goa", "Category": "Hill", "Engagement": 1 }
        ]));

        let TopicView::Travel(view) = derive_view(&Topic::Travel, &rows) else {
            panic!("expected travel view");
        };
        assert_eq!(view.travel_categories, vec![point("Beach", 1.0), point("Hill", 1.0)]);
        assert_eq!(view.india_states, vec![point("Goa", 4.0)]);
        assert!(view.karnataka_cities.is_empty());
    }

    #[test]
    fn test_travel_truncation_limits() {
        let mut data = Vec::new();
        for i in 0..12 {
            data.push(json!({ "State": format!("State{}", i), "Location": format!("City{}", i), "Engagement": 100 - i }));
            data.push(json!({ "State": "Karnataka", "Location": format!("KCity{}", i), "Engagement": 50 - i }));
        }
        let rows = rows(serde_json::Value::Array(data));

        let TopicView::Travel(view) = derive_view(&Topic::Travel, &rows) else {
            panic!("expected travel view");
        };
        assert_eq!(view.india_states.len(), 7);
        assert_eq!(view.india_locations.len(), 10);
        assert_eq!(view.karnataka_cities.len(), 10);
        assert_eq!(view.karnataka_cities[0].name, "KCity0");
        assert!(view.india_states.iter().all(|p| p.name != "Karnataka"));
    }

    #[test]
    fn test_politics_view_top_six_per_region() {
        let mut data = Vec::new();
        for i in 0..8 {
            data.push(json!({ "State": "Delhi", "Politician": format!("P{}", i), "Engagement": 10 + i }));
        }
        data.push(json!({ "State": "Karnataka", "Politician": "Siddaramaiah", "Engagement": 7 }));
        let rows = rows(serde_json::Value::Array(data));

        let TopicView::Politics(view) = derive_view(&Topic::Politics, &rows) else {
            panic!("expected politics view");
        };
        assert_eq!(view.india_politicians.len(), 6);
        assert_eq!(view.india_politicians[0], point("P7", 17.0));
        assert_eq!(view.karnataka_politicians, vec![point("Siddaramaiah", 7.0)]);
    }

    #[test]
    fn test_default_view_hourly_series() {
        let rows = rows(json!([
            { "State": "Karnataka", "Industry": "Sandalwood", "Hour": 3, "Engagement": 4 },
            { "State": "Karnataka", "Industry": "Sandalwood", "Hour": 3, "Engagement": 6 },
            { "State": "Karnataka", "Industry": "Sandalwood", "Hour": 1, "Engagement": 2 },
            { "State": "Maharashtra", "Industry": "Bollywood", "Hour": 5, "Engagement": 8 }
        ]));

        let TopicView::Default(view) = derive_view(&Topic::Cinema, &rows) else {
            panic!("expected default view");
        };
        assert_eq!(
            view.karnataka_hourly,
            vec![HourPoint { hour: 1, value: 2.0 }, HourPoint { hour: 3, value: 10.0 }]
        );
        assert_eq!(view.india_dim, vec![point("Bollywood", 8.0)]);
        assert_eq!(view.india_dim_label, CINEMA_INDUSTRY_LABEL);
    }

    #[test]
    fn test_unknown_topic_falls_back_to_default() {
        let view = derive_view(&Topic::Other("food".to_string()), &[]);
        assert!(matches!(view, TopicView::Default(_)));
    }

    #[test]
    fn test_empty_rows_produce_empty_series() {
        for topic in [Topic::Travel, Topic::Politics, Topic::Sports, Topic::Cinema] {
            let view = derive_view(&topic, &[]);
            for panel in view.panels() {
                assert!(panel.series.is_empty(), "{} {}", topic, panel.id);
            }
        }
    }

    #[test]
    fn test_view_serializes_with_mode_tag() {
        let view = derive_view(&Topic::Sports, &[]);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["mode"], "sports");
        assert_eq!(value["indiaSportsPersons"], json!([]));
    }

    #[test]
    fn test_panels_titles_and_placeholders() {
        let view = derive_view(&Topic::Cinema, &[]);
        let panels = view.panels();
        let titles: Vec<&str> = panels.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "India – State Trends",
                "India – Top Cities",
                "India – Cinema Industries (India)",
                "Karnataka – Hourly Engagement",
            ]
        );
        assert_eq!(panels[0].placeholder(), None);
        assert_eq!(
            panels[3].placeholder(),
            Some("No Karnataka data available for the selected filters.")
        );

        let sports = derive_view(&Topic::Sports, &[]).panels();
        assert_eq!(sports[0].title, "India – Sports vs Engagement");
        assert_eq!(sports[1].title, "India – States vs Engagement (Sports)");
    }
}
