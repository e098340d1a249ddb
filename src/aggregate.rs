//! Engagement aggregation over dashboard rows.
//!
//! Everything here is pure and infallible: rows come from a complete API
//! response and missing values degrade to zero instead of erroring.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::types::{Dimension, Row};

/// State that marks the drill-down region.
pub const KARNATAKA: &str = "Karnataka";

/// Dimension values never ranked as series entries.
pub const EXCLUDED_KEYS: &[&str] = &["Other", "Unknown"];

/// Travel categories shown as their own bar; everything else buckets into "Other".
pub const TRAVEL_CATEGORIES: &[&str] = &["Hill", "Mountains", "Beach", "Trekking", "Religious"];

/// Synthesized bucket for travel categories outside the allow-list.
pub const OTHER_BUCKET: &str = "Other";

/// One entry of a ranked series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub name: String,
    pub value: f64,
}

/// Ranked `{name, value}` entries, highest value first.
pub type NamedSeries = Vec<SeriesPoint>;

/// Engagement summed for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourPoint {
    pub hour: i64,
    pub value: f64,
}

/// Rows partitioned into rest-of-India and Karnataka.
#[derive(Debug, Clone, Default)]
pub struct RegionSplit<'a> {
    pub india: Vec<&'a Row>,
    pub karnataka: Vec<&'a Row>,
}

impl RegionSplit<'_> {
    pub fn len(&self) -> usize {
        self.india.len() + self.karnataka.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition rows by state. Rows without a state count as India.
pub fn split_regions(rows: &[Row]) -> RegionSplit<'_> {
    let (karnataka, india): (Vec<&Row>, Vec<&Row>) = rows
        .iter()
        .partition(|row| row.dimension(Dimension::State) == Some(KARNATAKA));
    RegionSplit { india, karnataka }
}

fn is_rankable(key: &str) -> bool {
    !key.is_empty() && !EXCLUDED_KEYS.contains(&key)
}

/// Sum engagement per key and rank descending.
///
/// Rows whose key is missing, empty, "Other" or "Unknown" are skipped. Equal
/// totals keep the order in which their keys were first seen.
pub fn grouped_sum<'a, I, F>(rows: I, key: F) -> NamedSeries
where
    I: IntoIterator<Item = &'a Row>,
    F: Fn(&'a Row) -> Option<&'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<SeriesPoint> = Vec::new();

    for row in rows {
        let Some(k) = key(row) else { continue };
        if !is_rankable(k) {
            continue;
        }
        let engagement = row.engagement_or_zero();
        match index.get(k) {
            Some(&i) => totals[i].value += engagement,
            None => {
                index.insert(k, totals.len());
                totals.push(SeriesPoint {
                    name: k.to_string(),
                    value: engagement,
                });
            }
        }
    }

    // Vec::sort_by is stable, so ties stay in first-seen order.
    totals.sort_by(|a, b| b.value.total_cmp(&a.value));
    totals
}

/// `grouped_sum` over a single dimension field.
pub fn sum_by<'a, I>(rows: I, dim: Dimension) -> NamedSeries
where
    I: IntoIterator<Item = &'a Row>,
{
    grouped_sum(rows, move |row| row.dimension(dim))
}

/// Keep the first `limit` entries.
pub fn top(mut series: NamedSeries, limit: usize) -> NamedSeries {
    series.truncate(limit);
    series
}

/// Travel category with non-allow-listed values folded into "Other".
pub fn travel_bucket(category: Option<&str>) -> &str {
    match category {
        Some(c) if TRAVEL_CATEGORIES.contains(&c) => c,
        _ => OTHER_BUCKET,
    }
}

/// Travel categories ranked by engagement.
///
/// The "Other" bucket is produced here and then dropped by the same exclusion
/// rule as a source "Other", so only allow-listed categories are returned.
pub fn travel_categories<'a, I>(rows: I) -> NamedSeries
where
    I: IntoIterator<Item = &'a Row>,
{
    grouped_sum(rows, |row| {
        Some(travel_bucket(row.dimension(Dimension::Category)))
    })
}

/// Engagement per hour of day, ascending by hour.
///
/// Missing hours count as hour 0. Only hours with at least one row appear.
pub fn hourly_engagement<'a, I>(rows: I) -> Vec<HourPoint>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut by_hour: BTreeMap<i64, f64> = BTreeMap::new();
    for row in rows {
        *by_hour.entry(row.hour_or_zero()).or_insert(0.0) += row.engagement_or_zero();
    }
    by_hour
        .into_iter()
        .map(|(hour, value)| HourPoint { hour, value })
        .collect()
}
