// In crates/app-config/src/types.rs

use core_types::{StrategyKind, ViewParams};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Where the backtest data comes from.
    pub provider: ProviderSettings,
    pub server: ServerSettings,
    /// Default presentation parameters, overridable per request.
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL of the backtest API, e.g. `http://localhost:8000`.
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Re-fetch each slot on this period. Fetch once when unset.
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct DashboardSettings {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
}

impl DashboardSettings {
    /// The configured defaults as validated view parameters.
    pub fn view_params(&self) -> core_types::Result<ViewParams> {
        let defaults = ViewParams::default();
        ViewParams::new(
            self.strategy,
            self.confidence_threshold
                .unwrap_or(defaults.confidence_threshold),
        )
    }
}

/// Helper functions for serde defaults
fn default_log_level() -> String { "info".to_string() }
fn default_request_timeout() -> u64 { 10 }
