use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Configuration stored in ~/.sma-dashboard/config.json
///
/// Every field has a serde default, so an empty `{}` file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub default_topic: Topic,
    #[serde(default)]
    pub default_mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_topic: Topic::default(),
            default_mode: Mode::default(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

// =============================================================================
// Topic / Mode
// =============================================================================

/// Dashboard topic.
///
/// The analytics API only serves the four named topics, but rows and views can
/// carry any tag; unrecognised tags are kept verbatim in `Other` and rendered
/// with the default dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Topic {
    #[default]
    Travel,
    Politics,
    Sports,
    Cinema,
    Other(String),
}

impl Topic {
    pub fn as_str(&self) -> &str {
        match self {
            Topic::Travel => "travel",
            Topic::Politics => "politics",
            Topic::Sports => "sports",
            Topic::Cinema => "cinema",
            Topic::Other(tag) => tag,
        }
    }

    /// Map a wire tag to a topic. Never fails.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "travel" => Topic::Travel,
            "politics" => Topic::Politics,
            "sports" => Topic::Sports,
            "cinema" => Topic::Cinema,
            other => Topic::Other(other.to_string()),
        }
    }
}

impl From<String> for Topic {
    fn from(tag: String) -> Self {
        Topic::from_tag(&tag)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.as_str().to_string()
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.is_empty() {
            return Err("Topic must not be empty".to_string());
        }
        Ok(Topic::from_tag(&tag.to_lowercase()))
    }
}

/// Data window mode. Passed through to the analytics API untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Historical,
    Realtime,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Historical => "historical",
            Mode::Realtime => "realtime",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "historical" => Ok(Mode::Historical),
            "realtime" => Ok(Mode::Realtime),
            _ => Err(format!(
                "Invalid mode: '{}'. Must be 'historical' or 'realtime'.",
                s
            )),
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Dashboard query window.
///
/// Hours are plain integers: whatever the input control supplies is kept and
/// forwarded, including values outside 0–23. The analytics API is the only
/// validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilters {
    pub topic: Topic,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub start_hour: i32,
    pub end_hour: i32,
    #[serde(default)]
    pub mode: Mode,
}

impl DashboardFilters {
    /// Full-day window for a single date.
    pub fn for_day(topic: Topic, day: NaiveDate) -> Self {
        Self {
            topic,
            from_date: day,
            to_date: day,
            start_hour: 0,
            end_hour: 23,
            mode: Mode::Historical,
        }
    }

    /// Full-day window for today's local calendar date.
    pub fn today(topic: Topic) -> Self {
        Self::for_day(topic, chrono::Local::now().date_naive())
    }

    /// Label for the applied hour window, e.g. `"6:00 – 18:00"`.
    pub fn time_range_label(&self) -> String {
        format!("{}:00 – {}:00", self.start_hour, self.end_hour)
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Dimension fields a row can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    State,
    Location,
    Category,
    Politician,
    Party,
    Sport,
    SportsPerson,
    Movie,
    Industry,
}

impl Dimension {
    /// JSON field name on the wire.
    pub fn field_name(&self) -> &'static str {
        match self {
            Dimension::State => "State",
            Dimension::Location => "Location",
            Dimension::Category => "Category",
            Dimension::Politician => "Politician",
            Dimension::Party => "Party",
            Dimension::Sport => "Sport",
            Dimension::SportsPerson => "SportsPerson",
            Dimension::Movie => "Movie",
            Dimension::Industry => "Industry",
        }
    }
}

/// One engagement record.
///
/// Topic dimensions are all optional: a travel row carries `Category`, a
/// politics row `Politician`/`Party`, a sports row `Sport`/`SportsPerson` and a
/// cinema row `Movie`/`Industry`. Dimension values that are not JSON strings are
/// read as absent. `Engagement` and `Hour` that are absent or not numbers are
/// read as absent and count as 0 during aggregation. Everything else (text,
/// likes, sentiment, demographics) is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Location", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "State", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "Category", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "Politician", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub politician: Option<String>,
    #[serde(rename = "Party", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(rename = "Sport", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(rename = "SportsPerson", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sports_person: Option<String>,
    #[serde(rename = "Movie", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub movie: Option<String>,
    #[serde(rename = "Industry", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(rename = "Engagement", default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub engagement: Option<f64>,
    #[serde(rename = "Hour", default, deserialize_with = "lenient_hour", skip_serializing_if = "Option::is_none")]
    pub hour: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Row {
    pub fn dimension(&self, dim: Dimension) -> Option<&str> {
        let value = match dim {
            Dimension::State => &self.state,
            Dimension::Location => &self.location,
            Dimension::Category => &self.category,
            Dimension::Politician => &self.politician,
            Dimension::Party => &self.party,
            Dimension::Sport => &self.sport,
            Dimension::SportsPerson => &self.sports_person,
            Dimension::Movie => &self.movie,
            Dimension::Industry => &self.industry,
        };
        value.as_deref()
    }

    pub fn engagement_or_zero(&self) -> f64 {
        self.engagement.unwrap_or(0.0)
    }

    pub fn hour_or_zero(&self) -> i64 {
        self.hour.unwrap_or(0)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        // Numeric keys (pin codes, years) rank under their decimal text; zero is treated as missing.
        serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => Ok(n.as_f64()),
        _ => Ok(None),
    }
}

fn lenient_hour<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        // Fractional hours truncate toward zero.
        serde_json::Value::Number(n) => Ok(n.as_i64().or_else(|| n.as_f64().map(|h| h as i64))),
        _ => Ok(None),
    }
}

// =============================================================================
// Analytics API contract
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsHealth {
    pub total_records: String,
    pub engagement: String,
    pub timerange: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub llm_insights: Option<String>,
    #[serde(default)]
    pub metrics_health: Option<MetricsHealth>,
}

/// `GET /api/dashboard` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub topic: Topic,
    pub filters: DashboardFilters,
    #[serde(default)]
    pub summary: DashboardSummary,
    pub rows: Vec<Row>,
}

/// `POST /api/ai/insights` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsightsRequest {
    pub topic: Topic,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub start_hour: i32,
    pub end_hour: i32,
    #[serde(default)]
    pub mode: Mode,
}

impl From<&DashboardFilters> for AiInsightsRequest {
    fn from(filters: &DashboardFilters) -> Self {
        Self {
            topic: filters.topic.clone(),
            from_date: filters.from_date,
            to_date: filters.to_date,
            start_hour: filters.start_hour,
            end_hour: filters.end_hour,
            mode: filters.mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsightsResponse {
    pub topic: Topic,
    pub filters: DashboardFilters,
    pub insights: String,
    #[serde(default)]
    pub llm_provider: Option<String>,
    #[serde(default)]
    pub fallback: bool,
}

/// `POST /api/ai/chat` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatRequest {
    pub topic: Topic,
    pub question: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub start_hour: i32,
    pub end_hour: i32,
    #[serde(default)]
    pub mode: Mode,
}

impl AiChatRequest {
    pub fn new(filters: &DashboardFilters, question: impl Into<String>) -> Self {
        Self {
            topic: filters.topic.clone(),
            question: question.into(),
            from_date: filters.from_date,
            to_date: filters.to_date,
            start_hour: filters.start_hour,
            end_hour: filters.end_hour,
            mode: filters.mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatResponse {
    pub topic: Topic,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub llm_provider: Option<String>,
    #[serde(default)]
    pub fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_round_trips_known_and_unknown_tags() {
        let topic: Topic = serde_json::from_value(json!("sports")).unwrap();
        assert_eq!(topic, Topic::Sports);

        let other: Topic = serde_json::from_value(json!("food")).unwrap();
        assert_eq!(other, Topic::Other("food".to_string()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("food"));
    }

    #[test]
    fn test_topic_from_str_rejects_empty() {
        assert!("  ".parse::<Topic>().is_err());
        assert_eq!("Cinema".parse::<Topic>().unwrap(), Topic::Cinema);
    }

    #[test]
    fn test_mode_defaults_to_historical() {
        let filters: DashboardFilters = serde_json::from_value(json!({
            "topic": "travel",
            "fromDate": "2024-05-01",
            "toDate": "2024-05-02",
            "startHour": 0,
            "endHour": 23
        }))
        .unwrap();
        assert_eq!(filters.mode, Mode::Historical);
        assert!("weekly".parse::<Mode>().is_err());
    }

    #[test]
    fn test_row_tolerates_missing_and_non_numeric_fields() {
        let row: Row = serde_json::from_value(json!({
            "State": "Kerala",
            "Sport": "Football",
            "Engagement": "lots",
            "Sentiment": 0.4,
            "Text": "what a match"
        }))
        .unwrap();

        assert_eq!(row.dimension(Dimension::State), Some("Kerala"));
        assert_eq!(row.dimension(Dimension::Sport), Some("Football"));
        assert_eq!(row.engagement, None);
        assert_eq!(row.engagement_or_zero(), 0.0);
        assert_eq!(row.hour_or_zero(), 0);
        assert_eq!(row.extra.get("Text"), Some(&json!("what a match")));
    }

    #[test]
    fn test_row_numeric_dimension_keeps_its_text() {
        let row: Row = serde_json::from_value(json!({
            "State": null,
            "Location": 560001,
            "Industry": true,
            "Sport": 0,
            "Hour": 9.7,
            "Engagement": 12
        }))
        .unwrap();

        assert_eq!(row.dimension(Dimension::State), None);
        assert_eq!(row.dimension(Dimension::Location), Some("560001"));
        assert_eq!(row.dimension(Dimension::Industry), None);
        assert_eq!(row.dimension(Dimension::Sport), None);
        assert_eq!(row.hour, Some(9));
        assert_eq!(row.engagement, Some(12.0));
    }

    #[test]
    fn test_dashboard_response_parses_api_body() {
        let body = json!({
            "topic": "cinema",
            "filters": {
                "topic": "cinema",
                "fromDate": "2024-05-01",
                "toDate": "2024-05-01",
                "startHour": 0,
                "endHour": 23,
                "mode": "realtime"
            },
            "summary": {
                "llmInsights": null,
                "metricsHealth": {
                    "total_records": "100000",
                    "engagement": "1.2M",
                    "timerange": "00:00-23:00"
                }
            },
            "rows": [{ "State": "Karnataka", "Industry": "Sandalwood", "Engagement": 3, "Hour": 21 }]
        });

        let resp: DashboardResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.topic, Topic::Cinema);
        assert_eq!(resp.filters.mode, Mode::Realtime);
        assert_eq!(resp.rows.len(), 1);
        assert_eq!(
            resp.summary.metrics_health.as_ref().map(|m| m.total_records.as_str()),
            Some("100000")
        );
    }

    #[test]
    fn test_chat_request_copies_filter_window() {
        let mut filters =
            DashboardFilters::for_day(Topic::Politics, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        filters.start_hour = 6;
        filters.mode = Mode::Realtime;

        let req = AiChatRequest::new(&filters, "Who is trending?");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["topic"], json!("politics"));
        assert_eq!(value["fromDate"], json!("2024-03-09"));
        assert_eq!(value["startHour"], json!(6));
        assert_eq!(value["mode"], json!("realtime"));
        assert_eq!(value["question"], json!("Who is trending?"));
    }

    #[test]
    fn test_time_range_label() {
        let mut filters =
            DashboardFilters::for_day(Topic::Travel, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        filters.start_hour = 6;
        filters.end_hour = 18;
        assert_eq!(filters.time_range_label(), "6:00 – 18:00");
    }
}
