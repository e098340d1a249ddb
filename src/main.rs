//! sma-dashboard - topic engagement dashboards
//!
//! Fetches rows from the social media analyser API for a filter window and
//! prints the ranked series each topic dashboard charts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use sma_dashboard_lib::services::dashboard::DashboardSnapshot;
use sma_dashboard_lib::state::{self, AppState};
use sma_dashboard_lib::types::{
    AiChatRequest, AiInsightsRequest, Config, DashboardFilters, DashboardResponse,
};
use sma_dashboard_lib::view_model::{ChartPanel, PanelSeries};
use sma_dashboard_lib::{
    derive_view, DashboardSession, FilterPatch, FilterState, Mode, Row, Topic,
};

/// sma-dashboard - topic engagement dashboards
#[derive(Parser, Debug)]
#[command(name = "sma-dashboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file [default: ~/.sma-dashboard/config.json]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Analytics API base URL (overrides config and SMA_API_BASE_URL)
    #[arg(long)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Dashboard topic: travel, politics, sports or cinema [default: from config]
    #[arg(short, long, value_parser = parse_topic)]
    topic: Option<Topic>,

    /// First day of the window (YYYY-MM-DD) [default: today]
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the window (YYYY-MM-DD) [default: today]
    #[arg(long)]
    to: Option<NaiveDate>,

    /// First hour of the daily window [default: 0]
    #[arg(long, allow_hyphen_values = true)]
    start_hour: Option<i32>,

    /// Last hour of the daily window [default: 23]
    #[arg(long, allow_hyphen_values = true)]
    end_hour: Option<i32>,

    /// historical or realtime [default: from config]
    #[arg(long)]
    mode: Option<Mode>,
}

fn parse_topic(s: &str) -> Result<Topic, String> {
    s.parse()
}

impl FilterArgs {
    fn patch(&self) -> FilterPatch {
        FilterPatch {
            from_date: self.from,
            to_date: self.to,
            start_hour: self.start_hour,
            end_hour: self.end_hour,
            mode: self.mode,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a dashboard and print its series
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Build a dashboard from a saved API response or row array
    Aggregate {
        /// Dashboard topic (unknown topics use the default dashboard)
        #[arg(short, long, value_parser = parse_topic)]
        topic: Topic,

        /// JSON file with a dashboard response or a bare array of rows
        rows: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Ask the API for AI insights on a filter window
    Insights {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Ask a question about a filter window
    Chat {
        #[command(flatten)]
        filters: FilterArgs,

        /// Question to ask
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate {
            ref topic,
            ref rows,
            format,
        } => aggregate_file(topic, rows, format),
        Commands::Dashboard {
            ref filters,
            format,
        } => {
            let state = app_state(&cli)?;
            dashboard(&state, filters, format).await
        }
        Commands::Insights { ref filters } => {
            let state = app_state(&cli)?;
            let window = filter_window(&state, filters);
            let resp = state
                .source()
                .fetch_insights(&AiInsightsRequest::from(&window))
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            if resp.fallback {
                log::warn!("Insights served by fallback");
            }
            println!("{}", resp.insights);
            Ok(())
        }
        Commands::Chat {
            ref filters,
            ref question,
        } => {
            let state = app_state(&cli)?;
            let window = filter_window(&state, filters);
            let resp = state
                .source()
                .chat(&AiChatRequest::new(&window, question.as_str()))
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("{}", resp.answer);
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => state::load_config_from(path)
            .map(|c| state::apply_env_overrides(c, |key| std::env::var(key).ok())),
        None => state::load_config(),
    }
    .map_err(|e| anyhow!(e))?;

    if let Some(url) = &cli.api_base_url {
        config.api_base_url = url.clone();
    }
    Ok(config)
}

fn app_state(cli: &Cli) -> Result<AppState> {
    let config = resolve_config(cli)?;
    log::debug!("Using analytics API at {}", config.api_base_url);
    AppState::new(config).map_err(|e| anyhow!(e))
}

fn topic_or_default(state: &AppState, filters: &FilterArgs) -> Topic {
    filters
        .topic
        .clone()
        .unwrap_or_else(|| state.config.default_topic.clone())
}

/// Defaults for the topic with the command-line overrides applied.
fn filter_window(state: &AppState, filters: &FilterArgs) -> DashboardFilters {
    let mut window = FilterState::with_defaults(state.default_filters(topic_or_default(state, filters)));
    window.set_draft(filters.patch());
    window.apply()
}

fn open_session(state: &AppState, filters: &FilterArgs) -> DashboardSession {
    let session = state.session(topic_or_default(state, filters));
    session.set_draft(filters.patch());
    session
}

async fn dashboard(state: &AppState, filters: &FilterArgs, format: OutputFormat) -> Result<()> {
    let session = open_session(state, filters);
    session.apply().await;
    let snapshot = session.snapshot();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Table => {
            if let DashboardSnapshot::Success { header, panels, .. } = &snapshot {
                println!(
                    "{} dashboard: {} rows, hours {}",
                    session.topic(),
                    header.total_rows,
                    header.time_range
                );
                if let Some(health) = &header.metrics_health {
                    println!(
                        "Records: {}  Engagement: {}  Time range: {}",
                        health.total_records, health.engagement, health.timerange
                    );
                }
                println!();
                print_panels(panels);
                if let Some(insights) = &header.llm_insights {
                    println!("Insights:\n{}", insights);
                }
            }
        }
    }

    if let DashboardSnapshot::Error { error, .. } = snapshot {
        bail!(
            "{} - check that the analytics API is running on {}",
            error.message,
            state.config.api_base_url
        );
    }
    Ok(())
}

fn aggregate_file(topic: &Topic, path: &Path, format: OutputFormat) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let rows: Vec<Row> = if value.is_array() {
        serde_json::from_value(value).context("Failed to parse rows")?
    } else {
        serde_json::from_value::<DashboardResponse>(value)
            .context("Failed to parse dashboard response")?
            .rows
    };

    let view = derive_view(topic, &rows);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Table => print_panels(&view.panels()),
    }
    Ok(())
}

fn print_panels(panels: &[ChartPanel]) {
    for panel in panels {
        println!("{}", panel.title);
        if let Some(message) = panel.placeholder() {
            println!("  {}", message);
        } else {
            match &panel.series {
                PanelSeries::Named(series) => {
                    for point in series {
                        println!("  {:<32} {:>12.0}", point.name, point.value);
                    }
                }
                PanelSeries::Hourly(series) => {
                    for point in series {
                        println!("  Hour {:>2}:00{:>27.0}", point.hour, point.value);
                    }
                }
            }
        }
        println!();
    }
}
