// In crates/web-server/src/lib.rs

use analytics::{compute_view, DashboardView, RawBacktestData};
use app_config::types::ServerSettings;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use core_types::{DailyReturn, StockPerformance, ViewParams};
use events::{WsCache, WsMessage};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use types::{ConfidenceAnalysisResponse, MonthlyStatsResponse, SummaryResponse, ViewQuery};

pub mod error;
pub mod types;

pub use error::{Error, Result};

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Always holds the latest combined inputs from both provider slots.
    pub snapshot_rx: watch::Receiver<Arc<RawBacktestData>>,
    /// Used for any view parameter the request leaves unset.
    pub default_params: ViewParams,
    pub ws_tx: broadcast::Sender<WsMessage>, // For broadcasting live messages
    pub ws_cache: WsCache,                   // For replaying recent messages
}

impl AppState {
    /// Recomputes the view from the latest snapshot with the request's parameters.
    fn view(&self, query: &ViewQuery) -> Result<DashboardView> {
        let params = query.resolve(&self.default_params)?;
        let raw = self.snapshot_rx.borrow().clone();
        Ok(compute_view(&raw, &params))
    }
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    // The dashboard front end is served from elsewhere.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new()
        .route("/dashboard", get(get_dashboard_handler))
        .route("/daily-returns", get(get_daily_returns_handler))
        .route("/stock-performance", get(get_stock_performance_handler))
        .route("/confidence-analysis", get(get_confidence_analysis_handler))
        .route("/monthly-stats", get(get_monthly_stats_handler))
        .route("/summary", get(get_summary_handler))
        .route("/insights", get(get_insights_handler));

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for `GET /api/dashboard`. The whole view in one response.
async fn get_dashboard_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<DashboardView>> {
    Ok(Json(state.view(&query)?))
}

async fn get_daily_returns_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<DailyReturn>>> {
    Ok(Json(state.view(&query)?.snapshot.daily_returns))
}

/// Handler for `GET /api/stock-performance`. Best average return first.
async fn get_stock_performance_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<StockPerformance>>> {
    Ok(Json(state.view(&query)?.snapshot.stock_performance))
}

async fn get_confidence_analysis_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ConfidenceAnalysisResponse>> {
    let view = state.view(&query)?;
    Ok(Json(ConfidenceAnalysisResponse {
        buckets: view.snapshot.confidence_buckets,
        calibration: view.calibration,
        buckets_above_threshold: view.buckets_above_threshold,
        confidence_threshold: view.params.confidence_threshold,
    }))
}

async fn get_monthly_stats_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<MonthlyStatsResponse>> {
    let view = state.view(&query)?;
    Ok(Json(MonthlyStatsResponse {
        months: view.snapshot.monthly_stats,
        direction: view.direction,
    }))
}

async fn get_summary_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<SummaryResponse>> {
    let view = state.view(&query)?;
    Ok(Json(SummaryResponse {
        summary: view.snapshot.summary,
        display: view.display_summary,
        derived: view.derived,
    }))
}

async fn get_insights_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<[String; 5]>> {
    Ok(Json(state.view(&query)?.insights))
}

/// The handler for `GET /ws`.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Replays the cached messages, then forwards live ones until the client leaves.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    tracing::info!("New WebSocket client connected.");

    for msg in events::cached_messages(&state.ws_cache) {
        if send_json(&mut socket, &msg).await.is_err() {
            tracing::info!("WebSocket client disconnected during replay.");
            return;
        }
    }

    let mut rx = state.ws_tx.subscribe();

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(msg) => {
                    if send_json(&mut socket, &msg).await.is_err() {
                        tracing::info!("WebSocket client disconnected.");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "WebSocket client lagged behind. Skipping messages.");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some(Ok(msg)) = socket.next() => {
                if let Message::Close(_) = msg {
                    tracing::info!("WebSocket client sent close frame.");
                    break;
                }
            }
            else => {
                break;
            }
        }
    }
    tracing::info!("WebSocket client connection closed.");
}

/// Sends one message as JSON text. A message that fails to serialize is skipped.
async fn send_json(socket: &mut WebSocket, msg: &WsMessage) -> std::result::Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json_msg) => socket.send(Message::Text(json_msg.into())).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize WebSocket message.");
            Ok(())
        }
    }
}

/// The main entry point for running the web server.
///
/// Serves until the process is terminated or the listener fails.
pub async fn run(settings: ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(Error::ServerBindError)?;

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServeError)
}
