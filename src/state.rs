use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{AnalyticsClient, DashboardSource};
use crate::services::dashboard::DashboardSession;
use crate::types::{Config, DashboardFilters, Topic};

/// Environment variable that overrides `apiBaseUrl`.
pub const API_BASE_URL_ENV: &str = "SMA_API_BASE_URL";

/// Application state shared by every dashboard page
pub struct AppState {
    pub config: Config,
    source: Arc<dyn DashboardSource>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, String> {
        let client = AnalyticsClient::from_config(&config)?;
        Ok(Self::with_source(config, Arc::new(client)))
    }

    pub fn with_source(config: Config, source: Arc<dyn DashboardSource>) -> Self {
        Self { config, source }
    }

    pub fn source(&self) -> Arc<dyn DashboardSource> {
        self.source.clone()
    }

    /// Today's full-day window for `topic` in the configured mode.
    pub fn default_filters(&self, topic: Topic) -> DashboardFilters {
        let mut defaults = DashboardFilters::today(topic);
        defaults.mode = self.config.default_mode;
        defaults
    }

    /// New page session for `topic`.
    pub fn session(&self, topic: Topic) -> DashboardSession {
        DashboardSession::with_filters(self.source.clone(), self.default_filters(topic))
    }
}

pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".sma-dashboard").join("config.json"))
}

/// Load config from ~/.sma-dashboard/config.json, then apply env overrides.
///
/// A missing file yields defaults; a file that exists but cannot be read or
/// parsed is an error.
pub fn load_config() -> Result<Config, String> {
    let path = config_path()?;
    let config = load_config_from(&path)?;
    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

pub fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

pub fn apply_env_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(url) = lookup(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.api_base_url = url;
    }
    config
}
