// In crates/api-client/src/lib.rs

use app_config::ProviderSettings;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

pub mod error;
pub mod reference;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

/// A source of backtest payloads.
///
/// The two queries are independent: callers may issue them concurrently and
/// must cope with either one failing or never completing.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// The name of the provider, for diagnostics.
    fn name(&self) -> &'static str;

    /// Query A: `{ portfolioReturns: [...], stockPerformance: [...] }`.
    async fn fetch_returns(&self) -> Result<Value>;

    /// Query B: the global summary statistics object.
    async fn fetch_global_stats(&self) -> Result<Value>;
}

impl ProviderClient {
    /// Constructs a new ProviderClient from ProviderSettings.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;
        Ok(ProviderClient {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches an endpoint and parses the body as JSON.
    async fn get_json(&self, endpoint: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        tracing::debug!(endpoint, status = status.as_u16(), "Provider responded.");
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(Error::RequestFailed)?;
        let value: Value = serde_json::from_str(&text).map_err(Error::DeserializationFailed)?;
        Ok(value)
    }
}

#[async_trait]
impl DataProvider for ProviderClient {
    fn name(&self) -> &'static str {
        "http"
    }

    /// Fetches both halves of Query A concurrently. Either one failing fails the query.
    async fn fetch_returns(&self) -> Result<Value> {
        let (daily, per_stock) = tokio::try_join!(
            self.get_json(endpoints::DAILY_RETURNS),
            self.get_json(endpoints::PERFORMANCE_PER_STOCK),
        )?;
        Ok(merge_returns(daily, per_stock))
    }

    async fn fetch_global_stats(&self) -> Result<Value> {
        self.get_json(endpoints::GLOBAL_STATS).await
    }
}

/// Assembles Query A from the two endpoint payloads.
///
/// Each key is copied as-is (shape is validated downstream); a missing key
/// stays missing.
pub fn merge_returns(daily: Value, per_stock: Value) -> Value {
    let mut merged = Map::new();
    if let Some(returns) = take_key(daily, PORTFOLIO_RETURNS_KEY) {
        merged.insert(PORTFOLIO_RETURNS_KEY.to_string(), returns);
    }
    if let Some(stocks) = take_key(per_stock, STOCK_PERFORMANCE_KEY) {
        merged.insert(STOCK_PERFORMANCE_KEY.to_string(), stocks);
    }
    Value::Object(merged)
}

fn take_key(value: Value, key: &str) -> Option<Value> {
    match value {
        Value::Object(mut fields) => fields.remove(key),
        _ => None,
    }
}

// Free function to allow api_client::new usage
pub fn new(settings: &ProviderSettings) -> Result<ProviderClient> {
    ProviderClient::new(settings)
}
