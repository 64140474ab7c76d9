// In crates/api-client/src/types.rs

use reqwest::Client;

/// The client for the backtest provider's read-only HTTP API.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// The base URL of the provider, without a trailing slash.
    pub base_url: String,
}

/// Provider endpoints, relative to the base URL.
pub mod endpoints {
    pub const DAILY_RETURNS: &str = "/backtest/daily-returns";
    pub const PERFORMANCE_PER_STOCK: &str = "/backtest/performance-per-stock";
    pub const GLOBAL_STATS: &str = "/backtest/global-stats";
}

/// The keys Query A is assembled under.
pub const PORTFOLIO_RETURNS_KEY: &str = "portfolioReturns";
pub const STOCK_PERFORMANCE_KEY: &str = "stockPerformance";
