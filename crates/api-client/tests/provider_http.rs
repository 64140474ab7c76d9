//! Exercises `ProviderClient` against a local axum server standing in for the provider.

use api_client::{DataProvider, Error, ProviderClient};
use app_config::ProviderSettings;
use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_provider(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}

fn client_for(base_url: String) -> ProviderClient {
    ProviderClient::new(&ProviderSettings {
        base_url,
        request_timeout_secs: 5,
        refresh_interval_secs: None,
    })
    .unwrap()
}

fn healthy_provider() -> Router {
    Router::new()
        .route(
            "/backtest/daily-returns",
            get(|| async {
                Json(json!({"portfolioReturns": [{"Date": "2025-01-02", "CumulativeReturn": 0.01}]}))
            }),
        )
        .route(
            "/backtest/performance-per-stock",
            get(|| async {
                Json(json!({"stockPerformance": [{"ticker": "AAPL", "trades": 3, "winRate": 0.67, "avgReturn": 0.004, "sharpe": 1.2}]}))
            }),
        )
        .route(
            "/backtest/global-stats",
            get(|| async { Json(json!({"totalReturn": 0.12, "sharpe": 0.9})) }),
        )
}

#[tokio::test]
async fn fetch_returns_merges_both_endpoints() {
    let client = client_for(spawn_provider(healthy_provider()).await);

    let returns = client.fetch_returns().await.unwrap();
    assert_eq!(returns["portfolioReturns"].as_array().map(Vec::len), Some(1));
    assert_eq!(returns["stockPerformance"][0]["ticker"], "AAPL");
}

#[tokio::test]
async fn fetch_global_stats_returns_the_object() {
    let client = client_for(spawn_provider(healthy_provider()).await);

    let stats = client.fetch_global_stats().await.unwrap();
    assert_eq!(stats, json!({"totalReturn": 0.12, "sharpe": 0.9}));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let router = Router::new().route(
        "/backtest/global-stats",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = client_for(spawn_provider(router).await);

    match client.fetch_global_stats().await {
        Err(Error::Status { endpoint, status }) => {
            assert_eq!(endpoint, "/backtest/global-stats");
            assert_eq!(status, 500);
        }
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[tokio::test]
async fn one_failing_half_fails_query_a() {
    let router = Router::new().route(
        "/backtest/daily-returns",
        get(|| async { Json(json!({"portfolioReturns": []})) }),
    );
    let client = client_for(spawn_provider(router).await);

    let result = client.fetch_returns().await;
    assert!(matches!(result, Err(Error::Status { status: 404, .. })));
}

#[tokio::test]
async fn invalid_json_is_a_deserialization_error() {
    let router = Router::new().route("/backtest/global-stats", get(|| async { "{not json" }));
    let client = client_for(spawn_provider(router).await);

    let result: Result<Value, Error> = client.fetch_global_stats().await;
    assert!(matches!(result, Err(Error::DeserializationFailed(_))));
}

#[tokio::test]
async fn unreachable_provider_is_a_request_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{}", address));
    assert!(matches!(client.fetch_global_stats().await, Err(Error::RequestFailed(_))));
}
